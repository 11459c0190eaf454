//! WPA handshake accumulation for a single station.
//!
//! Frames arrive one at a time from the sniffer, classified by role. The
//! handshake keeps every frame it accepts in an append-only log, plus a
//! watermark counting how many of those frames are already in a capture
//! file.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::capture::CapturedPacket;
use crate::port::HandshakeCapture;

/// Role of a captured frame within a handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeFrame {
    /// Beacon of the access point, needed by crackers for the ESSID.
    Beacon,
    /// EAPOL message 1 (ANonce from the access point).
    Challenge,
    /// EAPOL message 2 (SNonce + MIC from the station).
    Response,
    /// EAPOL message 3 (install from the access point).
    Confirmation,
    /// Message 1 carrying a PMKID in its RSN key data.
    Pmkid,
}

#[derive(Debug, Default)]
struct HandshakeState {
    has_beacon: bool,
    challenges: usize,
    responses: usize,
    confirmations: usize,
    pmkids: usize,
    packets: Vec<CapturedPacket>,
    saved: usize,
}

impl HandshakeState {
    fn is_complete(&self) -> bool {
        self.challenges > 0 && self.responses > 0 && self.confirmations > 0
    }

    fn is_half(&self) -> bool {
        self.responses > 0 && (self.challenges > 0 || self.confirmations > 0)
    }

    fn unsaved(&self) -> usize {
        self.packets.len() - self.saved
    }
}

/// Handshake material captured for one station.
#[derive(Debug, Default)]
pub struct Handshake {
    state: Mutex<HandshakeState>,
}

/// Serializable summary of a [`Handshake`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeSummary {
    pub complete: bool,
    pub half: bool,
    pub pmkid: bool,
    pub packets: usize,
    pub unsaved: usize,
}

impl Handshake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a captured frame.
    ///
    /// Only the first beacon is kept; later beacons are dropped since they
    /// add nothing for credential recovery. Returns `true` if the frame was
    /// added to the packet log.
    pub fn add_frame(&self, kind: HandshakeFrame, packet: CapturedPacket) -> bool {
        let mut state = self.state.lock();
        match kind {
            HandshakeFrame::Beacon => {
                if state.has_beacon {
                    return false;
                }
                state.has_beacon = true;
            }
            HandshakeFrame::Challenge => state.challenges += 1,
            HandshakeFrame::Response => state.responses += 1,
            HandshakeFrame::Confirmation => state.confirmations += 1,
            HandshakeFrame::Pmkid => {
                state.pmkids += 1;
                // a PMKID frame is also a message 1
                state.challenges += 1;
            }
        }
        state.packets.push(packet);
        true
    }

    /// Full handshake: messages 1, 2 and 3 were all captured.
    pub fn complete(&self) -> bool {
        self.state.lock().is_complete()
    }

    /// Enough for an attack on a half handshake: M1+M2 or M2+M3.
    pub fn half(&self) -> bool {
        self.state.lock().is_half()
    }

    pub fn has_pmkid(&self) -> bool {
        self.state.lock().pmkids > 0
    }

    /// `true` if any EAPOL or PMKID frame was captured.
    pub fn any(&self) -> bool {
        let state = self.state.lock();
        state.challenges + state.responses + state.confirmations > 0
    }

    /// Total number of frames in the packet log.
    pub fn num_packets(&self) -> usize {
        self.state.lock().packets.len()
    }

    /// Number of frames not yet written to a capture file.
    pub fn num_unsaved(&self) -> usize {
        self.state.lock().unsaved()
    }

    pub fn summary(&self) -> HandshakeSummary {
        let state = self.state.lock();
        HandshakeSummary {
            complete: state.is_complete(),
            half: state.is_half(),
            pmkid: state.pmkids > 0,
            packets: state.packets.len(),
            unsaved: state.unsaved(),
        }
    }
}

impl HandshakeCapture for Handshake {
    fn is_complete(&self) -> bool {
        self.complete()
    }

    fn has_pmkid(&self) -> bool {
        Handshake::has_pmkid(self)
    }

    fn unsaved_packets(&self) -> Vec<CapturedPacket> {
        let state = self.state.lock();
        state.packets[state.saved..].to_vec()
    }

    fn mark_saved(&self, count: usize) {
        let mut state = self.state.lock();
        state.saved = (state.saved + count).min(state.packets.len());
    }
}
