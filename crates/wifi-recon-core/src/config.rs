//! Runtime configuration for a recon session.
//!
//! [`ReconConfig`] is stored as JSON. Every field has a default, so a config
//! file only needs to name what it overrides.
//!
//! # Example
//!
//! ```rust
//! use wifi_recon_core::config::ReconConfig;
//! use wifi_recon_core::LinkType;
//!
//! let cfg = ReconConfig::default();
//! cfg.validate().expect("default config is valid");
//!
//! assert_eq!(cfg.link_type, LinkType::IEEE802_11_RADIOTAP);
//! assert_eq!(cfg.ap_ttl_secs, 300);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::capture::LinkType;
use crate::error::ConfigError;

/// Configuration consumed by whatever drives the registry: where handshakes
/// go, how often to flush them and when to forget silent access points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Capture file that handshakes are appended to.
    /// Default: **`wifi-handshakes.pcap`**.
    pub handshakes_file: PathBuf,

    /// Link type written to a newly created capture file.
    /// Default: **127** (802.11 + radiotap).
    pub link_type: LinkType,

    /// Access points not seen for this many seconds are pruned.
    /// Default: **300**.
    pub ap_ttl_secs: u64,

    /// Interval between handshake flushes, in seconds. Default: **10**.
    ///
    /// The crate has no timer of its own. The capture loop that owns the
    /// registry reads this (through [`ReconConfig::save_interval`]) to decide
    /// how often to call
    /// [`Registry::save_handshakes_to`](crate::Registry::save_handshakes_to).
    pub save_interval_secs: u64,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            handshakes_file: PathBuf::from("wifi-handshakes.pcap"),
            link_type: LinkType::IEEE802_11_RADIOTAP,
            ap_ttl_secs: 300,
            save_interval_secs: 10,
        }
    }
}

impl ReconConfig {
    /// Load a [`ReconConfig`] from a JSON file at `path` and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] if the file cannot be opened and
    /// [`ConfigError::InvalidValue`] if the JSON is malformed or a value is
    /// out of range.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: ReconConfig = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::invalid_value("(file)", e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize to pretty-printed JSON and write it to `path`, creating
    /// parent directories if necessary.
    pub fn to_json(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::FileRead {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::invalid_value("(serialization)", e.to_string()))?;
        std::fs::write(path, json).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Validate all fields, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handshakes_file.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value(
                "handshakes_file",
                "must not be empty",
            ));
        }
        if self.ap_ttl_secs == 0 {
            return Err(ConfigError::invalid_value("ap_ttl_secs", "must be > 0"));
        }
        if i64::try_from(self.ap_ttl_secs).map_or(true, |s| s > i64::MAX / 1_000) {
            return Err(ConfigError::invalid_value("ap_ttl_secs", "is too large"));
        }
        if self.save_interval_secs == 0 {
            return Err(ConfigError::invalid_value(
                "save_interval_secs",
                "must be > 0",
            ));
        }
        Ok(())
    }

    /// The access point TTL as a duration, for
    /// [`Registry::prune_stale`](crate::Registry::prune_stale).
    pub fn ap_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ap_ttl_secs.min(i64::MAX as u64 / 1_000) as i64)
    }

    /// Flush period for the external capture loop, suitable for
    /// `std::thread::sleep` or a timer.
    pub fn save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.save_interval_secs)
    }
}
