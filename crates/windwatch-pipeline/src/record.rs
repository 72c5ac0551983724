use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use windwatch_store::StoredRecord;

/// Label format: day.month, newline, hour:minute.
pub const DISPLAY_LABEL_FORMAT: &str = "%d.%m\n%H:%M";

/// One forecast slot in provider-independent shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Forecast instant in the local offset used for windowing
    pub timestamp: DateTime<FixedOffset>,
    /// `timestamp` rendered with [`DISPLAY_LABEL_FORMAT`]
    pub display_label: String,
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_degree: u16,
}

impl NormalizedRecord {
    pub fn display_label_for(timestamp: &DateTime<FixedOffset>) -> String {
        timestamp.format(DISPLAY_LABEL_FORMAT).to_string()
    }
}

impl From<&NormalizedRecord> for StoredRecord {
    fn from(record: &NormalizedRecord) -> Self {
        StoredRecord {
            timestamp: record.timestamp,
            datetime_str: record.display_label.clone(),
            temperature: record.temperature,
            humidity: record.humidity,
            wind_speed: record.wind_speed,
            wind_degree: record.wind_degree,
        }
    }
}
