//! Error types for the wifi-recon-core crate.
//!
//! ## Hierarchy
//!
//! ```text
//! WifiReconError (top-level)
//! ├── Io                   (capture file open / write failures)
//! ├── InvalidCaptureLength (packet metadata disagrees with its bytes)
//! ├── MalformedCapture     (capture file cannot be read back)
//! └── ConfigError          (config validation / file loading)
//! ```
//!
//! Lookup misses and unknown channel mappings are not errors: they are
//! reported through `Option` and the `0` sentinel respectively.

use std::path::PathBuf;
use thiserror::Error;

/// Convenient `Result` alias used across the crate.
pub type Result<T> = std::result::Result<T, WifiReconError>;

/// Top-level error type for registry persistence and capture file handling.
#[derive(Debug, Error)]
pub enum WifiReconError {
    /// Opening, creating or writing a capture file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A packet's captured length does not match its payload, or exceeds
    /// the original on-air length.
    #[error("invalid capture length: captured {captured} bytes, payload {payload} bytes, original {original} bytes")]
    InvalidCaptureLength {
        /// Captured length recorded in the packet metadata.
        captured: u32,
        /// Number of payload bytes actually present.
        payload: usize,
        /// Original on-air length recorded in the packet metadata.
        original: u32,
    },

    /// A capture file could not be parsed.
    #[error("malformed capture file: {0}")]
    MalformedCapture(String),

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors produced while loading or validating a [`crate::config::ReconConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to access config file {path:?}: {source}")]
    FileRead {
        /// Path that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A field holds a value outside its permitted range, or the file is not
    /// valid JSON.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
