//! Incremental handshake persistence.
//!
//! [`Registry::save_handshakes_to`] appends every not-yet-saved packet of
//! every station holding usable key material to a pcap file. It is meant to
//! be called repeatedly over a run: each call only adds records, and a packet
//! is marked saved as soon as its record is written, so it is never written
//! twice, even if an earlier call failed midway.
//!
//! The registry lock is held for the whole call, file I/O included. A slow
//! disk therefore stalls `upsert` on sniffer threads until the flush is done.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::capture::pcap::{LinkType, PcapWriter};
use crate::domain::registry::Registry;
use crate::error::Result;
use crate::port::{AccessPointRecord, HandshakeCapture, StationRecord};

/// Snapshot length recorded in newly created capture files.
pub const DEFAULT_SNAPLEN: u32 = 65536;

/// What a single call to [`Registry::save_handshakes_to`] wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    /// A global header was written because the file was new (or empty).
    pub header_written: bool,
    /// Stations that contributed at least one packet.
    pub stations: usize,
    /// Packet records appended.
    pub packets: usize,
}

impl<A: AccessPointRecord> Registry<A> {
    /// Append captured handshake packets to the pcap file at `path`.
    ///
    /// The file is created with a header (snaplen [`DEFAULT_SNAPLEN`],
    /// `link_type`) if it does not exist yet. A file that exists but is
    /// empty also gets a header, since it could not be read back without
    /// one; any other existing file is assumed to carry a valid header and is
    /// not checked.
    ///
    /// Only stations whose handshake is complete or holds a PMKID are
    /// flushed. Packets are written with their original timestamp and
    /// lengths and unmodified bytes.
    ///
    /// # Errors
    ///
    /// The first open or write failure aborts the call and is returned,
    /// including a packet rejected with
    /// [`WifiReconError::InvalidCaptureLength`](crate::WifiReconError::InvalidCaptureLength).
    /// The file keeps its header and every record written before the
    /// failure; the failing packet and all packets after it stay pending for
    /// the next call.
    pub fn save_handshakes_to(
        &self,
        path: impl AsRef<Path>,
        link_type: LinkType,
    ) -> Result<SaveSummary> {
        let path = path.as_ref();
        let access_points = self.lock_access_points();

        let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        let result = write_pending(&access_points, file, needs_header.then_some(link_type));
        match &result {
            Ok(summary) if summary.packets > 0 || summary.header_written => {
                tracing::info!(
                    path = %path.display(),
                    link_type = %link_type,
                    header = summary.header_written,
                    stations = summary.stations,
                    packets = summary.packets,
                    "saved handshakes"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "handshake save aborted"),
        }
        result
    }

    /// Same as [`save_handshakes_to`](Self::save_handshakes_to), writing to an
    /// arbitrary sink. A global header is written first when `header` names
    /// a link type; pass `None` when the sink already continues a capture.
    pub fn write_handshakes<W: Write>(
        &self,
        sink: W,
        header: Option<LinkType>,
    ) -> Result<SaveSummary> {
        let access_points = self.lock_access_points();
        write_pending(&access_points, sink, header)
    }
}

fn write_pending<A: AccessPointRecord, W: Write>(
    access_points: &HashMap<String, Arc<A>>,
    sink: W,
    header: Option<LinkType>,
) -> Result<SaveSummary> {
    let mut writer = PcapWriter::new(sink);
    let mut summary = SaveSummary::default();

    if let Some(link_type) = header {
        writer.write_file_header(DEFAULT_SNAPLEN, link_type)?;
        summary.header_written = true;
    }

    for ap in access_points.values() {
        for station in ap.clients() {
            let handshake = station.handshake();
            if !(handshake.is_complete() || handshake.has_pmkid()) {
                continue;
            }

            let mut written = 0;
            for packet in handshake.unsaved_packets() {
                if let Err(e) = writer.write_packet(&packet) {
                    tracing::warn!(
                        ap = ap.mac(),
                        station = station.mac(),
                        written = summary.packets + written,
                        error = %e,
                        "failed to write handshake packet"
                    );
                    return Err(e);
                }
                handshake.mark_saved(1);
                written += 1;
            }
            if written > 0 {
                summary.packets += written;
                summary.stations += 1;
            }
        }
    }

    writer.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::pcap::{PcapReader, FILE_HEADER_LEN, RECORD_HEADER_LEN};
    use crate::capture::CapturedPacket;
    use crate::domain::handshake::HandshakeFrame;
    use crate::AccessPoint;
    use chrono::Utc;
    use std::fs::File;
    use tempfile::tempdir;

    fn feed(ap: &AccessPoint, client: &str, kinds: &[HandshakeFrame]) {
        let (sta, _) = ap.add_client_if_new(client, 2437, -50);
        for (i, kind) in kinds.iter().enumerate() {
            sta.handshake().add_frame(
                *kind,
                CapturedPacket::new(Utc::now(), vec![i as u8; 10 + i]),
            );
        }
    }

    #[test]
    fn writes_header_once_and_packets_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("handshakes.pcap");

        let reg: Registry = Registry::new();
        let (ap, _) = reg.upsert("Home", "00:11:22:33:44:55", 2437, -40);
        feed(
            &ap,
            "aa:aa:aa:aa:aa:01",
            &[
                HandshakeFrame::Challenge,
                HandshakeFrame::Response,
                HandshakeFrame::Confirmation,
            ],
        );

        let first = reg
            .save_handshakes_to(&path, LinkType::IEEE802_11_RADIOTAP)
            .unwrap();
        assert_eq!(
            first,
            SaveSummary {
                header_written: true,
                stations: 1,
                packets: 3
            }
        );
        let len_after_first = fs::metadata(&path).unwrap().len();
        assert_eq!(
            len_after_first as usize,
            FILE_HEADER_LEN + 3 * RECORD_HEADER_LEN + 10 + 11 + 12
        );

        let second = reg
            .save_handshakes_to(&path, LinkType::IEEE802_11_RADIOTAP)
            .unwrap();
        assert_eq!(second, SaveSummary::default());
        assert_eq!(fs::metadata(&path).unwrap().len(), len_after_first);
    }

    #[test]
    fn skips_stations_without_key_material() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hs.pcap");

        let reg: Registry = Registry::new();
        let (ap, _) = reg.upsert("Home", "00:11:22:33:44:55", 2437, -40);
        feed(&ap, "aa:aa:aa:aa:aa:01", &[HandshakeFrame::Challenge]);
        feed(&ap, "aa:aa:aa:aa:aa:02", &[HandshakeFrame::Pmkid]);

        let summary = reg.save_handshakes_to(&path, LinkType::IEEE802_11).unwrap();
        assert_eq!(summary.stations, 1);
        assert_eq!(summary.packets, 1);

        let reader = PcapReader::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(reader.header().link_type, LinkType::IEEE802_11);
        assert_eq!(reader.header().snaplen, DEFAULT_SNAPLEN);
        assert_eq!(reader.count(), 1);
    }

    #[test]
    fn empty_registry_still_creates_a_valid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.pcap");

        let reg: Registry = Registry::new();
        let summary = reg.save_handshakes_to(&path, LinkType::ETHERNET).unwrap();
        assert!(summary.header_written);
        assert_eq!(fs::metadata(&path).unwrap().len() as usize, FILE_HEADER_LEN);

        let summary = reg.save_handshakes_to(&path, LinkType::ETHERNET).unwrap();
        assert!(!summary.header_written);
        assert_eq!(fs::metadata(&path).unwrap().len() as usize, FILE_HEADER_LEN);
    }

    #[test]
    fn empty_existing_file_gets_a_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("touched.pcap");
        File::create(&path).unwrap();

        let reg: Registry = Registry::new();
        let summary = reg.save_handshakes_to(&path, LinkType::PPI).unwrap();
        assert!(summary.header_written);

        let reader = PcapReader::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(reader.header().link_type, LinkType::PPI);
    }

    #[test]
    fn open_failure_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("hs.pcap");

        let reg: Registry = Registry::new();
        assert!(reg.save_handshakes_to(&path, LinkType::ETHERNET).is_err());
    }
}
