//! Captured link-layer frames.

use chrono::{DateTime, Utc};

/// One captured frame with the metadata a capture file records for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPacket {
    /// When the frame was captured.
    pub timestamp: DateTime<Utc>,
    /// Number of bytes captured; equals `data.len()` for a well-formed packet.
    pub captured_len: u32,
    /// Length of the frame on the air, which may exceed `captured_len` when
    /// the capture was truncated.
    pub original_len: u32,
    /// Raw frame bytes, link-layer header included.
    pub data: Vec<u8>,
}

impl CapturedPacket {
    /// A packet captured in full.
    pub fn new(timestamp: DateTime<Utc>, data: Vec<u8>) -> Self {
        let len = data.len() as u32;
        Self {
            timestamp,
            captured_len: len,
            original_len: len,
            data,
        }
    }

    /// A packet whose capture was cut short of its on-air length.
    pub fn truncated(timestamp: DateTime<Utc>, original_len: u32, data: Vec<u8>) -> Self {
        Self {
            timestamp,
            captured_len: data.len() as u32,
            original_len,
            data,
        }
    }
}
