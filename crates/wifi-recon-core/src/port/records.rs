//! Contracts for the entities stored in a [`crate::Registry`].
//!
//! Entities are shared as `Arc`s and mutated in place through `&self`, so
//! implementations are expected to use interior mutability. None of these
//! methods may call back into the registry that owns the entity.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::capture::CapturedPacket;

/// Captured authentication material for one station.
pub trait HandshakeCapture: Send + Sync {
    /// `true` once enough of the 4-way handshake was captured to attempt
    /// credential recovery.
    fn is_complete(&self) -> bool;

    /// `true` if a PMKID was captured.
    fn has_pmkid(&self) -> bool;

    /// Packets captured after the saved watermark, oldest first.
    ///
    /// Calling this does not move the watermark: the same packets are
    /// returned again until [`mark_saved`](Self::mark_saved) is called.
    fn unsaved_packets(&self) -> Vec<CapturedPacket>;

    /// Advance the saved watermark by `count` packets.
    ///
    /// The persister calls this once per packet record successfully written,
    /// which is what keeps every packet in a capture file at most once.
    fn mark_saved(&self, count: usize);
}

/// A client station (or an access point's own radio identity).
pub trait StationRecord: Send + Sync {
    /// Handshake type held by this station.
    type Handshake: HandshakeCapture;

    /// Normalized MAC address.
    fn mac(&self) -> &str;

    /// The station's handshake.
    fn handshake(&self) -> &Self::Handshake;
}

/// An access point tracked by the registry.
pub trait AccessPointRecord: Send + Sync {
    /// Station type used for clients and for the self station.
    type Station: StationRecord;

    /// Build a record for a first observation. `mac` is already normalized.
    fn create(essid: &str, mac: &str, frequency_mhz: u32, rssi: i8) -> Self
    where
        Self: Sized;

    /// Normalized MAC address; never changes after creation.
    fn mac(&self) -> &str;

    /// Replace the display name.
    fn set_hostname(&self, hostname: &str);

    /// Replace the signal strength, in dBm.
    fn set_rssi(&self, rssi: i8);

    /// When this access point was last observed.
    fn last_seen(&self) -> DateTime<Utc>;

    /// Record an observation time.
    fn set_last_seen(&self, at: DateTime<Utc>);

    /// Look up a client by normalized MAC.
    fn client(&self, mac: &str) -> Option<Arc<Self::Station>>;

    /// Snapshot of every client station.
    fn clients(&self) -> Vec<Arc<Self::Station>>;

    /// The station representing the access point's own radio.
    fn self_station(&self) -> Arc<Self::Station>;
}
