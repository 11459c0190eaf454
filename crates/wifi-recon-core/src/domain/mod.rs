//! Domain types for the access point registry.

pub mod access_point;
pub mod channel;
pub mod essid;
pub mod handshake;
pub mod mac;
pub mod registry;
pub mod station;

pub use access_point::AccessPoint;
pub use channel::{channel_to_frequency, frequency_to_channel, Band};
pub use essid::is_bogus_essid;
pub use handshake::{Handshake, HandshakeFrame, HandshakeSummary};
pub use mac::normalize_mac;
pub use registry::{ApCallback, Registry};
pub use station::{Station, StationSnapshot};
