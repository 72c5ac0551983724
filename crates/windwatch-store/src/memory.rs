//! In-memory forecast store, for tests and dry runs.

use parking_lot::Mutex;
use std::collections::BTreeMap;

use crate::backend::{ForecastStore, StoreError, StoreResult, UpsertOutcome};
use crate::record::StoredRecord;

#[derive(Debug, Default)]
struct Inner {
    documents: BTreeMap<i64, StoredRecord>,
    writes: usize,
    fail_after: Option<usize>,
}

/// `BTreeMap`-backed store keyed by Unix seconds.
#[derive(Debug, Default)]
pub struct MemoryForecastStore {
    inner: Mutex<Inner>,
}

impl MemoryForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that accepts `successful_writes` upserts and then reports
    /// itself unavailable.
    pub fn failing_after(successful_writes: usize) -> Self {
        let store = Self::default();
        store.inner.lock().fail_after = Some(successful_writes);
        store
    }

    /// Number of upserts that were applied.
    pub fn write_count(&self) -> usize {
        self.inner.lock().writes
    }
}

impl ForecastStore for MemoryForecastStore {
    fn upsert(&self, record: &StoredRecord) -> StoreResult<UpsertOutcome> {
        let mut inner = self.inner.lock();

        if matches!(inner.fail_after, Some(limit) if inner.writes >= limit) {
            return Err(StoreError::unavailable("memory store is offline"));
        }

        inner.writes += 1;
        let outcome = match inner.documents.insert(record.key(), record.clone()) {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Inserted,
        };
        Ok(outcome)
    }

    fn get(&self, timestamp: i64) -> StoreResult<Option<StoredRecord>> {
        Ok(self.inner.lock().documents.get(&timestamp).cloned())
    }

    fn list(&self) -> StoreResult<Vec<StoredRecord>> {
        Ok(self.inner.lock().documents.values().cloned().collect())
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.inner.lock().documents.len())
    }
}
