//! Raw provider entries → [`NormalizedRecord`].
//!
//! This is the only place that knows the provider's nesting
//! (`dt`, `main.temp`, `main.humidity`, `wind.speed`, `wind.deg`).

use chrono::{Offset, TimeZone};
use serde_json::Value;
use windwatch_core::MalformedEntryPolicy;
use windwatch_forecast::RawForecastEntry;

use crate::error::PipelineError;
use crate::record::NormalizedRecord;

const FIELD_DT: &str = "dt";
const FIELD_TEMP: &str = "main.temp";
const FIELD_HUMIDITY: &str = "main.humidity";
const FIELD_WIND_SPEED: &str = "wind.speed";
const FIELD_WIND_DEG: &str = "wind.deg";

/// Output of [`extract_with_policy`].
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub records: Vec<NormalizedRecord>,
    /// Entries dropped under [`MalformedEntryPolicy::Skip`]
    pub skipped: usize,
}

/// Extract every entry, failing on the first malformed one.
///
/// Output order matches input order. Unknown fields are ignored.
pub fn extract<Tz: TimeZone>(
    entries: &[RawForecastEntry],
    tz: &Tz,
) -> Result<Vec<NormalizedRecord>, PipelineError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| extract_entry(index, entry, tz))
        .collect()
}

/// Extract with an explicit policy for malformed entries.
pub fn extract_with_policy<Tz: TimeZone>(
    entries: &[RawForecastEntry],
    tz: &Tz,
    policy: MalformedEntryPolicy,
) -> Result<Extraction, PipelineError> {
    match policy {
        MalformedEntryPolicy::Fail => Ok(Extraction {
            records: extract(entries, tz)?,
            skipped: 0,
        }),
        MalformedEntryPolicy::Skip => {
            let mut records = Vec::with_capacity(entries.len());
            let mut skipped = 0;
            for (index, entry) in entries.iter().enumerate() {
                match extract_entry(index, entry, tz) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!("Skipping forecast entry: {}", e);
                        skipped += 1;
                    }
                }
            }
            Ok(Extraction { records, skipped })
        }
    }
}

fn extract_entry<Tz: TimeZone>(
    index: usize,
    entry: &RawForecastEntry,
    tz: &Tz,
) -> Result<NormalizedRecord, PipelineError> {
    let dt = required(index, entry, FIELD_DT)?
        .as_i64()
        .ok_or_else(|| PipelineError::malformed(index, FIELD_DT, "is not an integer"))?;

    let local = tz
        .timestamp_opt(dt, 0)
        .single()
        .ok_or_else(|| PipelineError::malformed(index, FIELD_DT, "is out of range"))?;
    let timestamp = local.with_timezone(&local.offset().fix());

    let temperature = number(index, entry, FIELD_TEMP)?;

    let humidity = required(index, entry, FIELD_HUMIDITY)?
        .as_u64()
        .ok_or_else(|| {
            PipelineError::malformed(index, FIELD_HUMIDITY, "is not a non-negative integer")
        })?;
    let humidity = u8::try_from(humidity)
        .map_err(|_| PipelineError::malformed(index, FIELD_HUMIDITY, "is out of range"))?;

    let wind_speed = number(index, entry, FIELD_WIND_SPEED)?;

    let wind_deg = number(index, entry, FIELD_WIND_DEG)?.round();
    if !(0.0..=360.0).contains(&wind_deg) {
        return Err(PipelineError::malformed(index, FIELD_WIND_DEG, "is not a bearing"));
    }
    let wind_degree = wind_deg as u16;

    Ok(NormalizedRecord {
        display_label: NormalizedRecord::display_label_for(&timestamp),
        timestamp,
        temperature,
        humidity,
        wind_speed,
        wind_degree,
    })
}

fn required<'a>(
    index: usize,
    entry: &'a RawForecastEntry,
    field: &'static str,
) -> Result<&'a Value, PipelineError> {
    match entry.field(field) {
        Some(Value::Null) | None => Err(PipelineError::malformed(index, field, "is missing")),
        Some(value) => Ok(value),
    }
}

fn number(index: usize, entry: &RawForecastEntry, field: &'static str) -> Result<f64, PipelineError> {
    required(index, entry, field)?
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PipelineError::malformed(index, field, "is not a number"))
}
