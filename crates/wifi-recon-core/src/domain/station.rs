//! Station entity: one radio seen on the air.
//!
//! Used both for client devices and, inside [`crate::AccessPoint`], for the
//! access point's own radio identity.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Serialize, Serializer};

use crate::domain::channel::frequency_to_channel;
use crate::domain::handshake::{Handshake, HandshakeSummary};
use crate::port::StationRecord;

/// Mutable observed attributes of a station.
#[derive(Debug, Clone, Default)]
struct StationInfo {
    hostname: String,
    vendor: String,
    frequency: u32,
    rssi: i8,
    last_seen: DateTime<Utc>,
    sent: u64,
    received: u64,
    encryption: String,
    cipher: String,
    authentication: String,
}

/// A wireless station.
///
/// The MAC address and first-seen time are fixed at construction; every
/// other attribute sits behind a lock and is updated in place.
#[derive(Debug)]
pub struct Station {
    mac: String,
    first_seen: DateTime<Utc>,
    info: RwLock<StationInfo>,
    handshake: Handshake,
}

/// Point-in-time copy of a [`Station`], as serialized.
#[derive(Debug, Clone, Serialize)]
pub struct StationSnapshot {
    pub mac: String,
    pub hostname: String,
    pub vendor: String,
    pub frequency: u32,
    pub channel: u8,
    pub rssi: i8,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub sent: u64,
    pub received: u64,
    pub encryption: String,
    pub cipher: String,
    pub authentication: String,
    pub handshake: HandshakeSummary,
}

impl Station {
    /// Create a station first observed now. `mac` must already be
    /// normalized.
    pub fn new(hostname: &str, mac: &str, frequency: u32, rssi: i8) -> Self {
        let now = Utc::now();
        Self {
            mac: mac.to_owned(),
            first_seen: now,
            info: RwLock::new(StationInfo {
                hostname: hostname.to_owned(),
                frequency,
                rssi,
                last_seen: now,
                ..StationInfo::default()
            }),
            handshake: Handshake::new(),
        }
    }

    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub fn hostname(&self) -> String {
        self.info.read().hostname.clone()
    }

    pub fn set_hostname(&self, hostname: &str) {
        self.info.write().hostname = hostname.to_owned();
    }

    pub fn vendor(&self) -> String {
        self.info.read().vendor.clone()
    }

    pub fn set_vendor(&self, vendor: &str) {
        self.info.write().vendor = vendor.to_owned();
    }

    /// Centre frequency in MHz.
    pub fn frequency(&self) -> u32 {
        self.info.read().frequency
    }

    pub fn set_frequency(&self, frequency: u32) {
        self.info.write().frequency = frequency;
    }

    /// Channel derived from the frequency; `0` if it has no mapping.
    pub fn channel(&self) -> u8 {
        frequency_to_channel(self.frequency())
    }

    /// Signal strength in dBm.
    pub fn rssi(&self) -> i8 {
        self.info.read().rssi
    }

    pub fn set_rssi(&self, rssi: i8) {
        self.info.write().rssi = rssi;
    }

    pub fn first_seen(&self) -> DateTime<Utc> {
        self.first_seen
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        self.info.read().last_seen
    }

    pub fn set_last_seen(&self, at: DateTime<Utc>) {
        self.info.write().last_seen = at;
    }

    /// Add to the byte counters.
    pub fn add_traffic(&self, sent: u64, received: u64) {
        let mut info = self.info.write();
        info.sent = info.sent.saturating_add(sent);
        info.received = info.received.saturating_add(received);
    }

    /// Bytes sent and received, in that order.
    pub fn traffic(&self) -> (u64, u64) {
        let info = self.info.read();
        (info.sent, info.received)
    }

    /// Record the security suite advertised by the station, e.g.
    /// `("WPA2", "CCMP", "PSK")`.
    pub fn set_security(&self, encryption: &str, cipher: &str, authentication: &str) {
        let mut info = self.info.write();
        info.encryption = encryption.to_owned();
        info.cipher = cipher.to_owned();
        info.authentication = authentication.to_owned();
    }

    pub fn encryption(&self) -> String {
        self.info.read().encryption.clone()
    }

    pub fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    pub fn snapshot(&self) -> StationSnapshot {
        let info = self.info.read().clone();
        StationSnapshot {
            mac: self.mac.clone(),
            channel: frequency_to_channel(info.frequency),
            hostname: info.hostname,
            vendor: info.vendor,
            frequency: info.frequency,
            rssi: info.rssi,
            first_seen: self.first_seen,
            last_seen: info.last_seen,
            sent: info.sent,
            received: info.received,
            encryption: info.encryption,
            cipher: info.cipher,
            authentication: info.authentication,
            handshake: self.handshake.summary(),
        }
    }
}

impl StationRecord for Station {
    type Handshake = Handshake;

    fn mac(&self) -> &str {
        &self.mac
    }

    fn handshake(&self) -> &Handshake {
        &self.handshake
    }
}

impl Serialize for Station {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_station_fields() {
        let sta = Station::new("printer", "aa:bb:cc:dd:ee:01", 2437, -55);
        assert_eq!(sta.mac(), "aa:bb:cc:dd:ee:01");
        assert_eq!(sta.hostname(), "printer");
        assert_eq!(sta.channel(), 6);
        assert_eq!(sta.rssi(), -55);
        assert_eq!(sta.first_seen(), sta.last_seen());
        assert!(!sta.handshake().any());
    }

    #[test]
    fn traffic_and_security() {
        let sta = Station::new("", "aa:bb:cc:dd:ee:02", 5180, -70);
        sta.add_traffic(100, 40);
        sta.add_traffic(1, u64::MAX);
        assert_eq!(sta.traffic(), (101, u64::MAX));

        sta.set_security("WPA2", "CCMP", "PSK");
        sta.set_vendor("Acme");
        let snap = sta.snapshot();
        assert_eq!(snap.encryption, "WPA2");
        assert_eq!(snap.cipher, "CCMP");
        assert_eq!(snap.authentication, "PSK");
        assert_eq!(snap.vendor, "Acme");
        assert_eq!(snap.channel, 36);
    }

    #[test]
    fn serializes_snapshot() {
        let sta = Station::new("tv", "aa:bb:cc:dd:ee:03", 2412, -40);
        let json = serde_json::to_value(&sta).unwrap();
        assert_eq!(json["mac"], "aa:bb:cc:dd:ee:03");
        assert_eq!(json["hostname"], "tv");
        assert_eq!(json["channel"], 1);
        assert_eq!(json["handshake"]["complete"], false);
    }
}
