//! Hazard record storage

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::RwLock;

use crate::record::Hazard;

/// Storage for hazard records
///
/// The [`RiskResolver`](crate::RiskResolver) reads records only
/// through this trait, so any backing store will do. Records are
/// keyed by [`Hazard::record_key()`].
pub trait HazardStore: Send + Sync {
    /// Record type held by this store
    type Record: Hazard + Clone;

    /// Snapshot of every record which matches `filter`
    ///
    /// Records are returned in store order. All of the records
    /// come from one consistent view of the store.
    fn fetch(&self, filter: &dyn Fn(&Self::Record) -> bool) -> Vec<Self::Record>;

    /// Insert or replace records
    ///
    /// A record replaces any existing record with the same key.
    /// Replaced and inserted records move to the end of the store
    /// order. Returns the number of records written.
    fn upsert(&self, records: Vec<Self::Record>) -> usize;

    /// Delete every record which has expired as of `now`
    ///
    /// Returns the number of records deleted.
    fn delete_expired(&self, now: &DateTime<Utc>) -> usize;
}

/// In-memory hazard store
///
/// ```
/// use spcrisk::{HazardStore, MemoryStore, OutlookRecord};
///
/// let store: MemoryStore<OutlookRecord> = MemoryStore::new();
/// assert_eq!(0, store.upsert(vec![]));
/// assert!(store.fetch(&|_| true).is_empty());
/// ```
#[derive(Debug)]
pub struct MemoryStore<R> {
    records: RwLock<Vec<R>>,
}

impl<R> MemoryStore<R> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> HazardStore for MemoryStore<R>
where
    R: Hazard + Clone + Send + Sync,
{
    type Record = R;

    fn fetch(&self, filter: &dyn Fn(&R) -> bool) -> Vec<R> {
        self.records
            .read()
            .iter()
            .filter(|rec| filter(rec))
            .cloned()
            .collect()
    }

    fn upsert(&self, records: Vec<R>) -> usize {
        let incoming: HashSet<String> = records.iter().map(|rec| rec.record_key()).collect();
        let count = records.len();

        let mut store = self.records.write();
        store.retain(|rec| !incoming.contains(&rec.record_key()));
        store.extend(records);
        count
    }

    fn delete_expired(&self, now: &DateTime<Utc>) -> usize {
        let mut store = self.records.write();
        let before = store.len();
        store.retain(|rec| !rec.is_expired_at(now));

        let deleted = before - store.len();
        if deleted > 0 {
            debug!("purged {} expired record(s)", deleted);
        }
        deleted
    }
}
