//! Capture file handling: the pcap codec and the handshake persister.

mod packet;
pub mod pcap;
pub mod persist;

pub use packet::CapturedPacket;
pub use pcap::{LinkType, PcapHeader, PcapReader, PcapWriter};
pub use persist::{SaveSummary, DEFAULT_SNAPLEN};
