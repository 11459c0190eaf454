//! Access point registry aggregate root.
//!
//! The [`Registry`] is the single source of truth for which access points
//! are currently visible. Sniffer threads feed it observations through
//! [`Registry::upsert`]; reporting code reads snapshots; the handshake
//! persister walks it to flush capture material (see
//! [`crate::capture::persist`]).
//!
//! # Locking
//!
//! One [`parking_lot::Mutex`] guards the access point map. Every public
//! operation holds it for its full duration. The lock is not reentrant:
//! lifecycle callbacks and [`Registry::for_each`] visitors run while it is
//! held and must not call back into the same registry, or the calling thread
//! deadlocks.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::{Mutex, MutexGuard};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::domain::access_point::AccessPoint;
use crate::domain::essid::is_bogus_essid;
use crate::domain::mac::normalize_mac;
use crate::port::{AccessPointRecord, HandshakeCapture, StationRecord};

/// Lifecycle handler, invoked with the registry lock held.
pub type ApCallback<A> = Box<dyn Fn(&Arc<A>) + Send + Sync>;

// ---------------------------------------------------------------------------
// Registry -- Aggregate Root
// ---------------------------------------------------------------------------

/// Concurrent map from normalized MAC address to access point record.
///
/// Records are shared as `Arc<A>` and mutated in place; an access point is
/// never replaced while it stays in the registry. Every key equals the MAC
/// stored inside its record.
pub struct Registry<A: AccessPointRecord = AccessPoint> {
    access_points: Mutex<HashMap<String, Arc<A>>>,
    on_new: Option<ApCallback<A>>,
    on_lost: Option<ApCallback<A>>,
}

impl<A: AccessPointRecord> Registry<A> {
    /// Create an empty registry with no lifecycle handlers.
    pub fn new() -> Self {
        Self {
            access_points: Mutex::new(HashMap::new()),
            on_new: None,
            on_lost: None,
        }
    }

    /// Install the handler fired when [`upsert`](Self::upsert) inserts an
    /// access point.
    ///
    /// The handler runs with the registry lock held and must not call any
    /// method of the same registry.
    pub fn on_new<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Arc<A>) + Send + Sync + 'static,
    {
        self.on_new = Some(Box::new(callback));
        self
    }

    /// Install the handler fired when an access point is removed by
    /// [`remove`](Self::remove) or [`prune_stale`](Self::prune_stale).
    ///
    /// Same reentrancy rule as [`on_new`](Self::on_new).
    pub fn on_lost<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Arc<A>) + Send + Sync + 'static,
    {
        self.on_lost = Some(Box::new(callback));
        self
    }

    /// Record an observation of an access point.
    ///
    /// For a known MAC the record is refreshed in place: last-seen moves to
    /// now, the signal strength is replaced unless `rssi` is `0`, and the
    /// name is replaced unless `essid` looks corrupted. For an unknown MAC a
    /// record is created, inserted and announced through the new handler.
    ///
    /// Returns the record and whether it was newly inserted.
    pub fn upsert(&self, essid: &str, mac: &str, frequency: u32, rssi: i8) -> (Arc<A>, bool) {
        let mac = normalize_mac(mac);
        let mut aps = self.access_points.lock();

        if let Some(ap) = aps.get(&mac) {
            ap.set_last_seen(Utc::now());
            if rssi != 0 {
                ap.set_rssi(rssi);
            }
            // keep the cleanest name we have seen
            if !is_bogus_essid(essid) {
                ap.set_hostname(essid);
            }
            return (Arc::clone(ap), false);
        }

        let ap = Arc::new(A::create(essid, &mac, frequency, rssi));
        aps.insert(mac, Arc::clone(&ap));

        tracing::debug!(mac = ap.mac(), essid, frequency, rssi, "new access point");
        if let Some(cb) = &self.on_new {
            cb(&ap);
        }

        (ap, true)
    }

    /// Look up an access point by MAC.
    pub fn get(&self, mac: &str) -> Option<Arc<A>> {
        self.access_points.lock().get(&normalize_mac(mac)).cloned()
    }

    /// Find a client station by MAC across all access points.
    ///
    /// If the same MAC is registered as a client of several access points,
    /// whichever is visited first wins; the visiting order is unspecified.
    pub fn get_station(&self, mac: &str) -> Option<Arc<A::Station>> {
        let mac = normalize_mac(mac);
        self.access_points
            .lock()
            .values()
            .find_map(|ap| ap.client(&mac))
    }

    /// Remove an access point and fire the lost handler.
    ///
    /// Returns the removed record; an unknown MAC is a silent no-op.
    pub fn remove(&self, mac: &str) -> Option<Arc<A>> {
        let mac = normalize_mac(mac);
        let mut aps = self.access_points.lock();

        let ap = aps.remove(&mac)?;
        tracing::debug!(mac = %mac, "access point removed");
        if let Some(cb) = &self.on_lost {
            cb(&ap);
        }
        Some(ap)
    }

    /// Remove every access point not seen within `ttl`, firing the lost
    /// handler once per evicted record. Returns the evicted records.
    pub fn prune_stale(&self, ttl: Duration) -> Vec<Arc<A>> {
        let Some(cutoff) = Utc::now().checked_sub_signed(ttl) else {
            return Vec::new();
        };
        let mut aps = self.access_points.lock();

        let stale: Vec<String> = aps
            .iter()
            .filter(|(_, ap)| ap.last_seen() < cutoff)
            .map(|(mac, _)| mac.clone())
            .collect();

        let mut evicted = Vec::with_capacity(stale.len());
        for mac in stale {
            if let Some(ap) = aps.remove(&mac) {
                if let Some(cb) = &self.on_lost {
                    cb(&ap);
                }
                evicted.push(ap);
            }
        }

        if !evicted.is_empty() {
            tracing::debug!(
                evicted = evicted.len(),
                remaining = aps.len(),
                ttl_secs = ttl.num_seconds(),
                "pruned stale access points"
            );
        }
        evicted
    }

    /// Snapshot of all access points, in no particular order.
    pub fn list(&self) -> Vec<Arc<A>> {
        self.access_points.lock().values().cloned().collect()
    }

    /// Snapshot of every access point's own station.
    pub fn list_stations(&self) -> Vec<Arc<A::Station>> {
        self.access_points
            .lock()
            .values()
            .map(|ap| ap.self_station())
            .collect()
    }

    /// Call `visitor(mac, ap)` once per access point, with the lock held.
    ///
    /// The visitor must not call back into this registry.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &Arc<A>),
    {
        for (mac, ap) in self.access_points.lock().iter() {
            visitor(mac, ap);
        }
    }

    /// Drop every access point. No lost handler fires.
    pub fn clear(&self) {
        *self.access_points.lock() = HashMap::new();
    }

    /// Number of client stations, across all access points, holding a
    /// complete handshake.
    pub fn count_completed_handshakes(&self) -> usize {
        self.access_points
            .lock()
            .values()
            .flat_map(|ap| ap.clients())
            .filter(|station| station.handshake().is_complete())
            .count()
    }

    /// Number of tracked access points.
    pub fn len(&self) -> usize {
        self.access_points.lock().len()
    }

    /// Whether no access point is tracked.
    pub fn is_empty(&self) -> bool {
        self.access_points.lock().is_empty()
    }

    /// Hold the registry lock; used by the persister so a flush sees a
    /// consistent device table.
    pub(crate) fn lock_access_points(&self) -> MutexGuard<'_, HashMap<String, Arc<A>>> {
        self.access_points.lock()
    }
}

impl<A: AccessPointRecord> Default for Registry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AccessPointRecord> fmt::Debug for Registry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("access_points", &self.len())
            .field("on_new", &self.on_new.is_some())
            .field("on_lost", &self.on_lost.is_some())
            .finish()
    }
}

/// Serializes as `{"aps": [...]}`, in no particular order.
impl<A: AccessPointRecord + Serialize> Serialize for Registry<A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let aps = self.access_points.lock();
        let list: Vec<&A> = aps.values().map(|ap| ap.as_ref()).collect();

        let mut doc = serializer.serialize_struct("Registry", 1)?;
        doc.serialize_field("aps", &list)?;
        doc.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
