//! # wifi-recon-core
//!
//! Live device table and handshake capture persistence for 802.11
//! monitor-mode reconnaissance.
//!
//! This crate provides:
//!
//! - **Registry**: [`Registry`], a concurrent map of access points keyed by
//!   normalized MAC, with idempotent [`Registry::upsert`] and lifecycle
//!   callbacks
//! - **Domain types**: [`AccessPoint`], [`Station`], [`Handshake`]
//! - **Ports**: [`AccessPointRecord`], [`StationRecord`], [`HandshakeCapture`]
//!   (the traits the registry and persister are written against)
//! - **Capture**: [`PcapWriter`] / [`PcapReader`] and
//!   [`Registry::save_handshakes_to`], which appends new handshake packets to
//!   a pcap file without ever writing a packet twice
//! - **Helpers**: [`frequency_to_channel`], [`channel_to_frequency`],
//!   [`normalize_mac`], [`is_bogus_essid`]
//!
//! ```rust
//! use wifi_recon_core::Registry;
//!
//! let registry: Registry = Registry::new();
//! let (ap, is_new) = registry.upsert("CoffeeShop", "00-11-22-33-44-55", 2437, -52);
//! assert!(is_new);
//! assert_eq!(ap.mac(), "00:11:22:33:44:55");
//! assert_eq!(ap.channel(), 6);
//! ```

pub mod capture;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

/// Crate version, as recorded in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export key types at the crate root for convenience.
pub use capture::{
    CapturedPacket, LinkType, PcapHeader, PcapReader, PcapWriter, SaveSummary, DEFAULT_SNAPLEN,
};
pub use config::ReconConfig;
pub use domain::{
    channel_to_frequency, frequency_to_channel, is_bogus_essid, normalize_mac, AccessPoint,
    ApCallback, Band, Handshake, HandshakeFrame, HandshakeSummary, Registry, Station,
    StationSnapshot,
};
pub use error::{ConfigError, Result, WifiReconError};
pub use port::{AccessPointRecord, HandshakeCapture, StationRecord};
