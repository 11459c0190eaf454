//! Port definitions for the device registry.
//!
//! The registry and the handshake persister only ever talk to access points,
//! stations and handshakes through these traits, so radio backends can plug
//! in their own entity types and tests can drive both against fakes.

mod records;

pub use records::{AccessPointRecord, HandshakeCapture, StationRecord};
