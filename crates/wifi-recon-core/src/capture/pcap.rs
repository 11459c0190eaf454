//! Classic libpcap capture file codec.
//!
//! Files are written little-endian with microsecond timestamps:
//!
//! ```text
//! global header (24 bytes)
//!   magic u32 | version_major u16 | version_minor u16 | thiszone i32
//!   sigfigs u32 | snaplen u32 | network (link type) u32
//! record header (16 bytes), repeated
//!   ts_sec u32 | ts_usec u32 | incl_len u32 | orig_len u32 | incl_len bytes
//! ```
//!
//! The reader additionally accepts big-endian files and the nanosecond
//! variant of the magic number.

use std::fmt;
use std::io::{self, Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capture::CapturedPacket;
use crate::error::{Result, WifiReconError};

/// Magic number for microsecond-resolution files.
pub const MAGIC_MICROS: u32 = 0xA1B2_C3D4;
/// Magic number for nanosecond-resolution files.
pub const MAGIC_NANOS: u32 = 0xA1B2_3C4D;
/// Size of the global file header in bytes.
pub const FILE_HEADER_LEN: usize = 24;
/// Size of a per-packet record header in bytes.
pub const RECORD_HEADER_LEN: usize = 16;

const VERSION_MAJOR: u16 = 2;
const VERSION_MINOR: u16 = 4;

// ---------------------------------------------------------------------------
// LinkType
// ---------------------------------------------------------------------------

/// Link-layer header type stored in the capture file header
/// (a `LINKTYPE_*` value from the tcpdump registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkType(pub u32);

impl LinkType {
    /// `LINKTYPE_ETHERNET`
    pub const ETHERNET: Self = Self(1);
    /// `LINKTYPE_IEEE802_11`: bare 802.11 frames.
    pub const IEEE802_11: Self = Self(105);
    /// `LINKTYPE_IEEE802_11_RADIOTAP`: 802.11 frames behind a radiotap header.
    pub const IEEE802_11_RADIOTAP: Self = Self(127);
    /// `LINKTYPE_PPI`
    pub const PPI: Self = Self(192);
}

impl Default for LinkType {
    fn default() -> Self {
        Self::IEEE802_11_RADIOTAP
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ETHERNET => write!(f, "EN10MB (1)"),
            Self::IEEE802_11 => write!(f, "IEEE802_11 (105)"),
            Self::IEEE802_11_RADIOTAP => write!(f, "IEEE802_11_RADIO (127)"),
            Self::PPI => write!(f, "PPI (192)"),
            Self(other) => write!(f, "LINKTYPE {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// PcapHeader
// ---------------------------------------------------------------------------

/// Decoded global header of a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcapHeader {
    /// Magic number as read in the file's own byte order.
    pub magic: u32,
    /// Major format version (2).
    pub version_major: u16,
    /// Minor format version (4).
    pub version_minor: u16,
    /// Maximum number of bytes stored per packet.
    pub snaplen: u32,
    /// Link-layer header type of every record.
    pub link_type: LinkType,
}

impl PcapHeader {
    /// `true` when record timestamps carry nanoseconds instead of
    /// microseconds.
    pub fn nanosecond_resolution(&self) -> bool {
        self.magic == MAGIC_NANOS
    }
}

// ---------------------------------------------------------------------------
// PcapWriter
// ---------------------------------------------------------------------------

/// Writes pcap records to any [`Write`] sink.
///
/// The writer does not track whether a header has been written: the caller
/// decides, which is what allows appending to an existing file.
pub struct PcapWriter<W: Write> {
    inner: W,
}

impl<W: Write> PcapWriter<W> {
    /// Wrap a sink.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write the 24-byte global header.
    pub fn write_file_header(&mut self, snaplen: u32, link_type: LinkType) -> Result<()> {
        let mut buf = [0u8; FILE_HEADER_LEN];
        buf[0..4].copy_from_slice(&MAGIC_MICROS.to_le_bytes());
        buf[4..6].copy_from_slice(&VERSION_MAJOR.to_le_bytes());
        buf[6..8].copy_from_slice(&VERSION_MINOR.to_le_bytes());
        // thiszone and sigfigs stay zero
        buf[16..20].copy_from_slice(&snaplen.to_le_bytes());
        buf[20..24].copy_from_slice(&link_type.0.to_le_bytes());
        self.inner.write_all(&buf)?;
        Ok(())
    }

    /// Write one packet record.
    ///
    /// The record header and payload go out in a single `write_all` so an
    /// unbuffered file never sees a header without its payload from this
    /// call alone.
    ///
    /// # Errors
    ///
    /// [`WifiReconError::InvalidCaptureLength`] if `captured_len` differs from
    /// the payload size or exceeds `original_len`; [`WifiReconError::Io`] if
    /// the sink fails.
    pub fn write_packet(&mut self, packet: &CapturedPacket) -> Result<()> {
        if packet.captured_len as usize != packet.data.len()
            || packet.captured_len > packet.original_len
        {
            return Err(WifiReconError::InvalidCaptureLength {
                captured: packet.captured_len,
                payload: packet.data.len(),
                original: packet.original_len,
            });
        }

        let ts_sec = packet.timestamp.timestamp().clamp(0, i64::from(u32::MAX)) as u32;
        let ts_usec = packet.timestamp.timestamp_subsec_micros().min(999_999);

        let mut buf = Vec::with_capacity(RECORD_HEADER_LEN + packet.data.len());
        buf.extend_from_slice(&ts_sec.to_le_bytes());
        buf.extend_from_slice(&ts_usec.to_le_bytes());
        buf.extend_from_slice(&packet.captured_len.to_le_bytes());
        buf.extend_from_slice(&packet.original_len.to_le_bytes());
        buf.extend_from_slice(&packet.data);
        self.inner.write_all(&buf)?;
        Ok(())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Unwrap the sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

// ---------------------------------------------------------------------------
// PcapReader
// ---------------------------------------------------------------------------

/// Reads a capture file header and then its records, in file order.
pub struct PcapReader<R: Read> {
    inner: R,
    header: PcapHeader,
    swapped: bool,
}

impl<R: Read> PcapReader<R> {
    /// Read and validate the global header.
    pub fn new(mut inner: R) -> Result<Self> {
        let mut buf = [0u8; FILE_HEADER_LEN];
        inner.read_exact(&mut buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                WifiReconError::MalformedCapture("file shorter than the global header".into())
            } else {
                WifiReconError::Io(e)
            }
        })?;

        let raw_magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let (magic, swapped) = match raw_magic {
            MAGIC_MICROS | MAGIC_NANOS => (raw_magic, false),
            m if m.swap_bytes() == MAGIC_MICROS || m.swap_bytes() == MAGIC_NANOS => {
                (m.swap_bytes(), true)
            }
            other => {
                return Err(WifiReconError::MalformedCapture(format!(
                    "unknown magic number {other:08x}"
                )))
            }
        };

        let read_u16 = |b: [u8; 2]| {
            if swapped {
                u16::from_be_bytes(b)
            } else {
                u16::from_le_bytes(b)
            }
        };
        let read_u32 = |b: [u8; 4]| {
            if swapped {
                u32::from_be_bytes(b)
            } else {
                u32::from_le_bytes(b)
            }
        };

        let header = PcapHeader {
            magic,
            version_major: read_u16([buf[4], buf[5]]),
            version_minor: read_u16([buf[6], buf[7]]),
            snaplen: read_u32([buf[16], buf[17], buf[18], buf[19]]),
            link_type: LinkType(read_u32([buf[20], buf[21], buf[22], buf[23]])),
        };

        tracing::debug!(
            magic = %format!("{:08x}", header.magic),
            version = %format!("{}.{}", header.version_major, header.version_minor),
            snaplen = header.snaplen,
            link_type = %header.link_type,
            "read capture file header"
        );

        Ok(Self {
            inner,
            header,
            swapped,
        })
    }

    /// The decoded global header.
    pub fn header(&self) -> &PcapHeader {
        &self.header
    }

    /// Read the next record. Returns `Ok(None)` at a clean end of file.
    pub fn next_packet(&mut self) -> Result<Option<CapturedPacket>> {
        let mut header_buf = [0u8; RECORD_HEADER_LEN];
        match read_full_or_eof(&mut self.inner, &mut header_buf)? {
            0 => return Ok(None),
            RECORD_HEADER_LEN => {}
            n => {
                return Err(WifiReconError::MalformedCapture(format!(
                    "truncated record header ({n} of {RECORD_HEADER_LEN} bytes)"
                )))
            }
        }

        let field = |i: usize| {
            let b = [
                header_buf[i],
                header_buf[i + 1],
                header_buf[i + 2],
                header_buf[i + 3],
            ];
            if self.swapped {
                u32::from_be_bytes(b)
            } else {
                u32::from_le_bytes(b)
            }
        };
        let (ts_sec, ts_frac, incl_len, orig_len) = (field(0), field(4), field(8), field(12));

        let mut data = vec![0u8; incl_len as usize];
        self.inner.read_exact(&mut data).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                WifiReconError::MalformedCapture(format!(
                    "truncated record payload (expected {incl_len} bytes)"
                ))
            } else {
                WifiReconError::Io(e)
            }
        })?;

        let nanos = if self.header.nanosecond_resolution() {
            ts_frac
        } else {
            ts_frac.saturating_mul(1_000)
        };
        let timestamp = DateTime::from_timestamp(i64::from(ts_sec), nanos).ok_or_else(|| {
            WifiReconError::MalformedCapture(format!("invalid timestamp {ts_sec}.{ts_frac}"))
        })?;

        Ok(Some(CapturedPacket {
            timestamp,
            captured_len: incl_len,
            original_len: orig_len,
            data,
        }))
    }
}

impl<R: Read> Iterator for PcapReader<R> {
    type Item = Result<CapturedPacket>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}

/// Fill `buf` completely, or report how many bytes were read before EOF.
fn read_full_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Cursor;

    fn packet(secs: i64, micros: u32, data: &[u8]) -> CapturedPacket {
        let ts = Utc.timestamp_opt(secs, micros * 1_000).unwrap();
        CapturedPacket::new(ts, data.to_vec())
    }

    #[test]
    fn header_layout_is_little_endian_v2_4() {
        let mut writer = PcapWriter::new(Vec::new());
        writer
            .write_file_header(65536, LinkType::IEEE802_11_RADIOTAP)
            .unwrap();
        let bytes = writer.into_inner();

        assert_eq!(bytes.len(), FILE_HEADER_LEN);
        assert_eq!(&bytes[0..4], &[0xd4, 0xc3, 0xb2, 0xa1]);
        assert_eq!(&bytes[4..8], &[2, 0, 4, 0]);
        assert_eq!(&bytes[8..16], &[0u8; 8]);
        assert_eq!(&bytes[16..20], &65536u32.to_le_bytes());
        assert_eq!(&bytes[20..24], &127u32.to_le_bytes());
    }

    #[test]
    fn record_layout() {
        let mut writer = PcapWriter::new(Vec::new());
        writer.write_packet(&packet(1_700_000_000, 42, b"abc")).unwrap();
        let bytes = writer.into_inner();

        assert_eq!(bytes.len(), RECORD_HEADER_LEN + 3);
        assert_eq!(&bytes[0..4], &1_700_000_000u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &42u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &3u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &3u32.to_le_bytes());
        assert_eq!(&bytes[16..], b"abc");
    }

    #[test]
    fn reader_returns_what_writer_wrote() {
        let first = packet(1_600_000_000, 1, &[0x80, 0x00, 0x01]);
        let second = CapturedPacket::truncated(
            Utc.timestamp_opt(1_600_000_001, 500_000_000).unwrap(),
            1500,
            vec![0x88; 64],
        );

        let mut writer = PcapWriter::new(Vec::new());
        writer.write_file_header(65536, LinkType::IEEE802_11).unwrap();
        writer.write_packet(&first).unwrap();
        writer.write_packet(&second).unwrap();

        let mut reader = PcapReader::new(Cursor::new(writer.into_inner())).unwrap();
        assert_eq!(reader.header().snaplen, 65536);
        assert_eq!(reader.header().link_type, LinkType::IEEE802_11);
        assert!(!reader.header().nanosecond_resolution());

        let packets: Vec<_> = reader.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(packets, vec![first, second]);
    }

    #[test]
    fn rejects_captured_length_mismatch() {
        let mut bad = packet(1, 0, b"abcd");
        bad.captured_len = 2;
        let mut writer = PcapWriter::new(Vec::new());
        let err = writer.write_packet(&bad).unwrap_err();
        assert!(matches!(err, WifiReconError::InvalidCaptureLength { .. }));
        assert!(writer.into_inner().is_empty());
    }

    #[test]
    fn rejects_captured_longer_than_original() {
        let mut bad = packet(1, 0, b"abcd");
        bad.original_len = 3;
        let mut writer = PcapWriter::new(Vec::new());
        assert!(writer.write_packet(&bad).is_err());
    }

    #[test]
    fn reads_big_endian_nanosecond_files() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC_NANOS.to_be_bytes());
        bytes.extend_from_slice(&2u16.to_be_bytes());
        bytes.extend_from_slice(&4u16.to_be_bytes());
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend_from_slice(&262_144u32.to_be_bytes());
        bytes.extend_from_slice(&105u32.to_be_bytes());
        bytes.extend_from_slice(&10u32.to_be_bytes());
        bytes.extend_from_slice(&123_456_789u32.to_be_bytes());
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&[0xaa, 0xbb]);

        let mut reader = PcapReader::new(Cursor::new(bytes)).unwrap();
        assert!(reader.header().nanosecond_resolution());
        assert_eq!(reader.header().link_type, LinkType::IEEE802_11);

        let pkt = reader.next_packet().unwrap().unwrap();
        assert_eq!(pkt.timestamp.timestamp(), 10);
        assert_eq!(pkt.timestamp.timestamp_subsec_nanos(), 123_456_789);
        assert_eq!(pkt.data, vec![0xaa, 0xbb]);
        assert!(reader.next_packet().unwrap().is_none());
    }

    #[test]
    fn bad_magic_and_truncation_are_malformed() {
        let err = PcapReader::new(Cursor::new(vec![0u8; 24])).err().unwrap();
        assert!(matches!(err, WifiReconError::MalformedCapture(_)));

        let err = PcapReader::new(Cursor::new(vec![0xd4, 0xc3])).err().unwrap();
        assert!(matches!(err, WifiReconError::MalformedCapture(_)));

        let mut writer = PcapWriter::new(Vec::new());
        writer.write_file_header(65536, LinkType::ETHERNET).unwrap();
        writer.write_packet(&packet(5, 0, b"hello")).unwrap();
        let mut bytes = writer.into_inner();
        bytes.truncate(bytes.len() - 2);

        let mut reader = PcapReader::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            reader.next_packet(),
            Err(WifiReconError::MalformedCapture(_))
        ));
    }

    #[test]
    fn link_type_display() {
        assert_eq!(LinkType::IEEE802_11_RADIOTAP.to_string(), "IEEE802_11_RADIO (127)");
        assert_eq!(LinkType(147).to_string(), "LINKTYPE 147");
    }
}
