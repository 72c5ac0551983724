//! One-decimal rounding of temperature and wind speed.

use crate::record::NormalizedRecord;

/// Round to one decimal place on the exact binary value, ties to even.
///
/// `0.15` is stored as `0.1499…` and rounds to `0.1`; `26.25` is an exact tie
/// and rounds to `26.2`.
pub fn round_one_decimal(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Round `temperature` and `wind_speed`; every other field passes through.
pub fn normalize(records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    records
        .into_iter()
        .map(|mut r| {
            r.temperature = round_one_decimal(r.temperature);
            r.wind_speed = round_one_decimal(r.wind_speed);
            r
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn record(hour: u32, temperature: f64, wind_speed: f64) -> NormalizedRecord {
        let timestamp = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2021, 5, 1, hour, 0, 0)
            .unwrap();
        NormalizedRecord {
            display_label: NormalizedRecord::display_label_for(&timestamp),
            timestamp,
            temperature,
            humidity: 63,
            wind_speed,
            wind_degree: 271,
        }
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(26.25), 26.2);
        assert_eq!(round_one_decimal(26.35), 26.4);
        assert_eq!(round_one_decimal(5.149), 5.1);
        assert_eq!(round_one_decimal(2.93), 2.9);
        assert_eq!(round_one_decimal(29.93), 29.9);
        assert_eq!(round_one_decimal(-3.26), -3.3);
        assert_eq!(round_one_decimal(18.0), 18.0);
    }

    #[test]
    fn test_round_near_ties_follow_exact_value() {
        assert_eq!(round_one_decimal(0.15), 0.1);
        assert_eq!(round_one_decimal(0.35), 0.3);
        assert_eq!(round_one_decimal(1.15), 1.1);
        assert_eq!(round_one_decimal(0.45), 0.5);
    }

    #[test]
    fn test_round_non_finite_passthrough() {
        assert!(round_one_decimal(f64::NAN).is_nan());
        assert_eq!(round_one_decimal(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_normalize_fields() {
        let out = normalize(vec![record(9, 26.25, 5.149)]);
        let r = &out[0];
        assert_eq!(r.temperature, 26.2);
        assert_eq!(r.wind_speed, 5.1);
        assert_eq!(r.humidity, 63);
        assert_eq!(r.wind_degree, 271);
        assert_eq!(r.display_label, "01.05\n09:00");
    }

    #[test]
    fn test_normalize_is_stable() {
        let once = normalize(vec![record(9, 12.345, 7.77), record(12, 0.05, 10.01)]);
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_order_preserved() {
        let out = normalize(vec![record(9, 1.0, 1.0), record(12, 2.0, 2.0), record(15, 3.0, 3.0)]);
        assert!(out.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}
