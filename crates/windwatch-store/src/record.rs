use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A forecast slot as persisted. `timestamp` is the unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Forecast instant, carrying the local offset it was windowed in
    pub timestamp: DateTime<FixedOffset>,
    /// `DD.MM\nHH:MM` label used by the chart and table
    pub datetime_str: String,
    /// Degrees Celsius, one decimal
    pub temperature: f64,
    /// Percent
    pub humidity: u8,
    /// Meters per second, one decimal
    pub wind_speed: f64,
    /// Compass bearing in degrees
    pub wind_degree: u16,
}

impl StoredRecord {
    /// Store key: Unix seconds of `timestamp`.
    pub fn key(&self) -> i64 {
        self.timestamp.timestamp()
    }
}
