//! Daylight window: keep slots whose local time is within 09:00:00–18:00:00.

use chrono::{NaiveTime, Timelike};

use crate::record::NormalizedRecord;

/// Window start, seconds after local midnight (09:00:00).
pub const DAYLIGHT_START_SECS: u32 = 9 * 3600;
/// Window end, seconds after local midnight (18:00:00).
pub const DAYLIGHT_END_SECS: u32 = 18 * 3600;

/// `09:00:00 <= time <= 18:00:00`, both ends inclusive.
pub fn is_daylight(time: &NaiveTime) -> bool {
    let secs = time.num_seconds_from_midnight();
    if secs == DAYLIGHT_END_SECS {
        return time.nanosecond() == 0;
    }
    (DAYLIGHT_START_SECS..DAYLIGHT_END_SECS).contains(&secs)
}

/// Keep only records whose local time of day is in the daylight window.
pub fn filter_daylight(records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    records
        .into_iter()
        .filter(|r| is_daylight(&r.timestamp.time()))
        .collect()
}
