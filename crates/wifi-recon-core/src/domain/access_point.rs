//! Access point entity.
//!
//! An access point is its own radio identity (a [`Station`]) plus the client
//! stations seen talking to it. Clients are keyed by normalized MAC.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::domain::channel::Band;
use crate::domain::mac::normalize_mac;
use crate::domain::station::Station;
use crate::port::AccessPointRecord;

/// A wireless access point and its associated clients.
#[derive(Debug)]
pub struct AccessPoint {
    station: Arc<Station>,
    clients: RwLock<HashMap<String, Arc<Station>>>,
}

impl AccessPoint {
    /// Create an access point first observed now. `mac` must already be
    /// normalized.
    pub fn new(essid: &str, mac: &str, frequency: u32, rssi: i8) -> Self {
        Self {
            station: Arc::new(Station::new(essid, mac, frequency, rssi)),
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// The access point's own radio identity.
    pub fn station(&self) -> &Arc<Station> {
        &self.station
    }

    pub fn mac(&self) -> &str {
        self.station.mac()
    }

    /// Display name (ESSID).
    pub fn essid(&self) -> String {
        self.station.hostname()
    }

    pub fn frequency(&self) -> u32 {
        self.station.frequency()
    }

    pub fn channel(&self) -> u8 {
        self.station.channel()
    }

    pub fn rssi(&self) -> i8 {
        self.station.rssi()
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        self.station.last_seen()
    }

    /// Register a client, or refresh it if already known.
    ///
    /// A known client gets its frequency and last-seen time updated, and its
    /// signal strength too unless `rssi` is `0` (no reading). Returns the
    /// client and whether it was newly added.
    pub fn add_client_if_new(&self, mac: &str, frequency: u32, rssi: i8) -> (Arc<Station>, bool) {
        let mac = normalize_mac(mac);
        let mut clients = self.clients.write();

        if let Some(client) = clients.get(&mac) {
            client.set_frequency(frequency);
            if rssi != 0 {
                client.set_rssi(rssi);
            }
            client.set_last_seen(Utc::now());
            return (Arc::clone(client), false);
        }

        let client = Arc::new(Station::new("", &mac, frequency, rssi));
        clients.insert(mac, Arc::clone(&client));
        (client, true)
    }

    /// Look up a client by MAC, normalizing it first.
    pub fn get_client(&self, mac: &str) -> Option<Arc<Station>> {
        self.clients.read().get(&normalize_mac(mac)).cloned()
    }

    /// Remove a client. Returns it if it was present.
    pub fn remove_client(&self, mac: &str) -> Option<Arc<Station>> {
        self.clients.write().remove(&normalize_mac(mac))
    }

    pub fn num_clients(&self) -> usize {
        self.clients.read().len()
    }

    /// Snapshot of the client list.
    pub fn client_list(&self) -> Vec<Arc<Station>> {
        self.clients.read().values().cloned().collect()
    }

    /// Number of clients holding a complete handshake.
    pub fn num_handshakes(&self) -> usize {
        self.clients
            .read()
            .values()
            .filter(|c| c.handshake().complete())
            .count()
    }

    /// `true` if any client holds a complete handshake or a PMKID.
    pub fn has_key_material(&self) -> bool {
        self.clients.read().values().any(|c| {
            let hs = c.handshake();
            hs.complete() || hs.has_pmkid()
        })
    }
}

impl AccessPointRecord for AccessPoint {
    type Station = Station;

    fn create(essid: &str, mac: &str, frequency_mhz: u32, rssi: i8) -> Self {
        Self::new(essid, mac, frequency_mhz, rssi)
    }

    fn mac(&self) -> &str {
        self.station.mac()
    }

    fn set_hostname(&self, hostname: &str) {
        self.station.set_hostname(hostname);
    }

    fn set_rssi(&self, rssi: i8) {
        self.station.set_rssi(rssi);
    }

    fn last_seen(&self) -> DateTime<Utc> {
        self.station.last_seen()
    }

    fn set_last_seen(&self, at: DateTime<Utc>) {
        self.station.set_last_seen(at);
    }

    fn client(&self, mac: &str) -> Option<Arc<Station>> {
        self.clients.read().get(mac).cloned()
    }

    fn clients(&self) -> Vec<Arc<Station>> {
        self.client_list()
    }

    fn self_station(&self) -> Arc<Station> {
        Arc::clone(&self.station)
    }
}

impl Serialize for AccessPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let snap = self.station.snapshot();
        let clients: Vec<_> = self.client_list().iter().map(|c| c.snapshot()).collect();

        let mut ap = serializer.serialize_struct("AccessPoint", 15)?;
        ap.serialize_field("mac", &snap.mac)?;
        ap.serialize_field("hostname", &snap.hostname)?;
        ap.serialize_field("vendor", &snap.vendor)?;
        ap.serialize_field("frequency", &snap.frequency)?;
        ap.serialize_field("channel", &snap.channel)?;
        ap.serialize_field("band", &Band::from_frequency(snap.frequency))?;
        ap.serialize_field("rssi", &snap.rssi)?;
        ap.serialize_field("first_seen", &snap.first_seen)?;
        ap.serialize_field("last_seen", &snap.last_seen)?;
        ap.serialize_field("encryption", &snap.encryption)?;
        ap.serialize_field("cipher", &snap.cipher)?;
        ap.serialize_field("authentication", &snap.authentication)?;
        ap.serialize_field("handshakes", &self.num_handshakes())?;
        ap.serialize_field("key_material", &self.has_key_material())?;
        ap.serialize_field("clients", &clients)?;
        ap.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CapturedPacket;
    use crate::domain::handshake::HandshakeFrame;

    fn ap() -> AccessPoint {
        AccessPoint::new("CoffeeShop", "00:11:22:33:44:55", 2462, -48)
    }

    #[test]
    fn exposes_self_station_identity() {
        let ap = ap();
        assert_eq!(ap.mac(), "00:11:22:33:44:55");
        assert_eq!(ap.essid(), "CoffeeShop");
        assert_eq!(ap.channel(), 11);
        assert_eq!(ap.rssi(), -48);
        assert_eq!(ap.self_station().mac(), ap.mac());
    }

    #[test]
    fn add_client_if_new_is_idempotent() {
        let ap = ap();
        let (first, is_new) = ap.add_client_if_new("AA-BB-CC-DD-EE-1", 2462, -60);
        assert!(is_new);
        assert_eq!(first.mac(), "aa:bb:cc:dd:ee:01");

        let (second, is_new) = ap.add_client_if_new("aa:bb:cc:dd:ee:01", 2467, 0);
        assert!(!is_new);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.frequency(), 2467);
        assert_eq!(second.rssi(), -60);
        assert_eq!(ap.num_clients(), 1);
    }

    #[test]
    fn client_lookup_and_removal() {
        let ap = ap();
        ap.add_client_if_new("aa:bb:cc:dd:ee:01", 2462, -60);
        assert!(ap.get_client("AA:BB:CC:DD:EE:01").is_some());
        assert!(ap.client("aa:bb:cc:dd:ee:01").is_some());
        assert!(ap.remove_client("aa:bb:cc:dd:ee:01").is_some());
        assert!(ap.get_client("aa:bb:cc:dd:ee:01").is_none());
        assert!(ap.remove_client("aa:bb:cc:dd:ee:01").is_none());
    }

    #[test]
    fn key_material_and_handshake_count() {
        let ap = ap();
        let (full, _) = ap.add_client_if_new("aa:bb:cc:dd:ee:01", 2462, -60);
        let (pmkid, _) = ap.add_client_if_new("aa:bb:cc:dd:ee:02", 2462, -61);
        assert!(!ap.has_key_material());

        let pkt = || CapturedPacket::new(Utc::now(), vec![0u8; 8]);
        pmkid.handshake().add_frame(HandshakeFrame::Pmkid, pkt());
        assert!(ap.has_key_material());
        assert_eq!(ap.num_handshakes(), 0);

        full.handshake().add_frame(HandshakeFrame::Challenge, pkt());
        full.handshake().add_frame(HandshakeFrame::Response, pkt());
        full.handshake().add_frame(HandshakeFrame::Confirmation, pkt());
        assert_eq!(ap.num_handshakes(), 1);
    }

    #[test]
    fn serializes_with_clients() {
        let ap = ap();
        ap.add_client_if_new("aa:bb:cc:dd:ee:01", 2462, -60);
        let json = serde_json::to_value(&ap).unwrap();
        assert_eq!(json["mac"], "00:11:22:33:44:55");
        assert_eq!(json["hostname"], "CoffeeShop");
        assert_eq!(json["channel"], 11);
        assert_eq!(json["band"], "2.4GHz");
        assert_eq!(json["clients"].as_array().unwrap().len(), 1);
        assert_eq!(json["handshakes"], 0);
    }
}
