//! Orchestration: fetch → extract → filter → normalize → persist.

use chrono::TimeZone;
use windwatch_core::MalformedEntryPolicy;
use windwatch_forecast::{ForecastClient, RawForecastEntry};
use windwatch_store::ForecastStore;

use crate::daylight::filter_daylight;
use crate::error::PipelineError;
use crate::extract::extract_with_policy;
use crate::normalize::normalize;
use crate::persist::{persist, PersistSummary};
use crate::record::NormalizedRecord;

/// Records ready to persist, with the counts of how they were derived.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub records: Vec<NormalizedRecord>,
    /// Entries returned by the provider
    pub fetched: usize,
    /// Malformed entries dropped under the skip policy
    pub skipped: usize,
}

/// What one pipeline run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub skipped: usize,
    /// Records inside the daylight window
    pub kept: usize,
    pub persisted: PersistSummary,
}

/// The pure middle of the pipeline, with no I/O.
pub fn transform<Tz: TimeZone>(
    entries: &[RawForecastEntry],
    tz: &Tz,
    policy: MalformedEntryPolicy,
) -> Result<Prepared, PipelineError> {
    let extraction = extract_with_policy(entries, tz, policy)?;
    tracing::debug!("Extracted {} of {} entries", extraction.records.len(), entries.len());

    let in_window = filter_daylight(extraction.records);
    tracing::debug!("{} records inside the daylight window", in_window.len());

    Ok(Prepared {
        records: normalize(in_window),
        fetched: entries.len(),
        skipped: extraction.skipped,
    })
}

/// One location's pipeline, bound to a client, a store and a local timezone.
pub struct Pipeline<'a, Tz: TimeZone> {
    client: &'a ForecastClient,
    store: &'a dyn ForecastStore,
    tz: Tz,
    policy: MalformedEntryPolicy,
}

impl<'a, Tz: TimeZone> Pipeline<'a, Tz> {
    pub fn new(client: &'a ForecastClient, store: &'a dyn ForecastStore, tz: Tz) -> Self {
        Self {
            client,
            store,
            tz,
            policy: MalformedEntryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MalformedEntryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch and transform without touching the store.
    pub async fn prepare(&self) -> Result<Prepared, PipelineError> {
        let entries = self.client.fetch_forecast_entries().await?;
        transform(&entries, &self.tz, self.policy)
    }

    /// Run every stage once. Any error ends the run; records already
    /// upserted before a persistence failure remain stored.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let prepared = self.prepare().await?;
        let persisted = persist(self.store, &prepared.records)?;

        let report = RunReport {
            fetched: prepared.fetched,
            skipped: prepared.skipped,
            kept: prepared.records.len(),
            persisted,
        };
        tracing::info!(
            "Forecast for {}: {} entries, {} in window, {} new, {} updated",
            self.client.location(),
            report.fetched,
            report.kept,
            report.persisted.inserted,
            report.persisted.updated
        );
        if report.skipped > 0 {
            tracing::warn!("{} malformed entries skipped", report.skipped);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::FixedOffset;
    use serde_json::json;

    // 2021-05-01 09:00 and 21:00 at UTC+3
    const MORNING: i64 = 1_619_848_800;
    const EVENING: i64 = 1_619_892_000;

    fn local() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    fn scenario() -> Vec<RawForecastEntry> {
        vec![
            RawForecastEntry::new(json!({
                "dt": MORNING,
                "main": {"temp": 26.2, "humidity": 50},
                "wind": {"speed": 2.93, "deg": 187}
            })),
            RawForecastEntry::new(json!({
                "dt": EVENING,
                "main": {"temp": 18.0, "humidity": 60},
                "wind": {"speed": 1.0, "deg": 90}
            })),
        ]
    }

    #[test]
    fn test_transform_scenario() {
        let prepared = transform(&scenario(), &local(), MalformedEntryPolicy::Fail).unwrap();

        assert_eq!(prepared.fetched, 2);
        assert_eq!(prepared.skipped, 0);
        assert_eq!(prepared.records.len(), 1);

        let r = &prepared.records[0];
        assert_eq!(r.timestamp.timestamp(), MORNING);
        assert_eq!(r.display_label, "01.05\n09:00");
        assert_eq!(r.temperature, 26.2);
        assert_eq!(r.humidity, 50);
        assert_eq!(r.wind_speed, 2.9);
        assert_eq!(r.wind_degree, 187);
    }

    #[test]
    fn test_transform_malformed_entry_outside_window_still_fails() {
        let mut entries = scenario();
        entries.push(RawForecastEntry::new(json!({"dt": EVENING + 10_800})));

        let err = transform(&entries, &local(), MalformedEntryPolicy::Fail).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedEntry { index: 2, .. }));
    }

    #[test]
    fn test_transform_skip_counts() {
        let mut entries = scenario();
        entries.insert(0, RawForecastEntry::new(json!({"dt": MORNING - 10_800})));

        let prepared = transform(&entries, &local(), MalformedEntryPolicy::Skip).unwrap();
        assert_eq!(prepared.fetched, 3);
        assert_eq!(prepared.skipped, 1);
        assert_eq!(prepared.records.len(), 1);
    }

    #[test]
    fn test_transform_empty() {
        let prepared = transform(&[], &local(), MalformedEntryPolicy::Fail).unwrap();
        assert!(prepared.records.is_empty());
        assert_eq!(prepared.fetched, 0);
    }
}
