//! Grouping Cache
//!
//! Memoized partitions of the record set by categorical attributes. Each
//! partition is built in a single pass, at most once per process lifetime;
//! a rebuild requires an explicit `reset()` and never happens implicitly.
//! Partitions hold record indices into the shared record slice, so lookups
//! stay O(1) without cloning bookings.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::types::BookingRecord;

type HotelGroups = HashMap<String, Vec<usize>>;
type CountryGroups = HashMap<String, Vec<usize>>;
type RequestGroups = BTreeMap<u32, Vec<usize>>;

pub struct GroupingCache {
    records: Arc<[BookingRecord]>,
    by_hotel: RwLock<Option<Arc<HotelGroups>>>,
    by_country: RwLock<Option<Arc<CountryGroups>>>,
    by_request_count: RwLock<Option<Arc<RequestGroups>>>,
}

impl GroupingCache {
    pub fn new(records: Arc<[BookingRecord]>) -> Self {
        Self {
            records,
            by_hotel: RwLock::new(None),
            by_country: RwLock::new(None),
            by_request_count: RwLock::new(None),
        }
    }

    /// Build all partitions eagerly so steady-state retrieval never pays
    /// for a rescan.
    pub fn precompute(&self) {
        self.by_hotel();
        self.by_country();
        self.by_request_count();
        tracing::debug!(records = self.records.len(), "Precomputed groupings");
    }

    /// Drop all partitions. The next accessor call rebuilds from the
    /// record set.
    pub fn reset(&self) {
        *self.by_hotel.write() = None;
        *self.by_country.write() = None;
        *self.by_request_count.write() = None;
    }

    pub fn by_hotel(&self) -> Arc<HotelGroups> {
        if let Some(groups) = self.by_hotel.read().as_ref() {
            return Arc::clone(groups);
        }
        let mut guard = self.by_hotel.write();
        // Another caller may have built it between the read and the write.
        if let Some(groups) = guard.as_ref() {
            return Arc::clone(groups);
        }
        let mut groups: HotelGroups = HashMap::new();
        for (idx, record) in self.records.iter().enumerate() {
            groups
                .entry(record.hotel_or_unknown().to_string())
                .or_default()
                .push(idx);
        }
        let groups = Arc::new(groups);
        *guard = Some(Arc::clone(&groups));
        groups
    }

    pub fn by_country(&self) -> Arc<CountryGroups> {
        if let Some(groups) = self.by_country.read().as_ref() {
            return Arc::clone(groups);
        }
        let mut guard = self.by_country.write();
        if let Some(groups) = guard.as_ref() {
            return Arc::clone(groups);
        }
        let mut groups: CountryGroups = HashMap::new();
        for (idx, record) in self.records.iter().enumerate() {
            groups
                .entry(record.country_or_unknown().to_string())
                .or_default()
                .push(idx);
        }
        let groups = Arc::new(groups);
        *guard = Some(Arc::clone(&groups));
        groups
    }

    pub fn by_request_count(&self) -> Arc<RequestGroups> {
        if let Some(groups) = self.by_request_count.read().as_ref() {
            return Arc::clone(groups);
        }
        let mut guard = self.by_request_count.write();
        if let Some(groups) = guard.as_ref() {
            return Arc::clone(groups);
        }
        let mut groups: RequestGroups = BTreeMap::new();
        for (idx, record) in self.records.iter().enumerate() {
            groups
                .entry(record.total_of_special_requests)
                .or_default()
                .push(idx);
        }
        let groups = Arc::new(groups);
        *guard = Some(Arc::clone(&groups));
        groups
    }
}
