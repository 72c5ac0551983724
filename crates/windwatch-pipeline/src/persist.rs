//! Idempotent upsert of normalized records.

use windwatch_store::{ForecastStore, StoredRecord, UpsertOutcome};

use crate::error::PipelineError;
use crate::record::NormalizedRecord;

/// Counts of what [`persist`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub inserted: usize,
    pub updated: usize,
}

impl PersistSummary {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Upsert each record keyed by its timestamp, in order.
///
/// Stops at the first failing write. Records written before the failure
/// stay written.
pub fn persist(
    store: &dyn ForecastStore,
    records: &[NormalizedRecord],
) -> Result<PersistSummary, PipelineError> {
    let mut summary = PersistSummary::default();

    for record in records {
        match store.upsert(&StoredRecord::from(record))? {
            UpsertOutcome::Inserted => summary.inserted += 1,
            UpsertOutcome::Updated => summary.updated += 1,
        }
    }

    tracing::debug!(
        "Persisted {} records ({} new, {} updated)",
        summary.total(),
        summary.inserted,
        summary.updated
    );
    Ok(summary)
}
