use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One forecast slot exactly as the provider sent it.
///
/// Kept as raw JSON so that a single misshapen entry can be reported by
/// field name instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawForecastEntry(Value);

impl RawForecastEntry {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a nested field by dotted path, e.g. `"wind.speed"`.
    pub fn field(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.0, |value, key| value.get(key))
    }
}

/// Top level of the `/forecast` response. Only `list` is of interest.
#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    #[serde(default)]
    pub list: Option<Vec<RawForecastEntry>>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    fn sample() -> RawForecastEntry {
        RawForecastEntry::new(json!({
            "dt": 1600117200,
            "main": {"temp": 26.2, "feels_like": 27.87, "humidity": 50},
            "wind": {"speed": 2.93, "deg": 336},
            "visibility": 10000
        }))
    }

    #[test]
    fn test_field_top_level() {
        assert_eq!(sample().field("dt"), Some(&json!(1600117200)));
    }

    #[test]
    fn test_field_nested() {
        let entry = sample();
        assert_eq!(entry.field("main.temp"), Some(&json!(26.2)));
        assert_eq!(entry.field("wind.deg"), Some(&json!(336)));
    }

    #[test]
    fn test_field_missing() {
        let entry = sample();
        assert!(entry.field("main.pressure").is_none());
        assert!(entry.field("rain.3h").is_none());
        assert!(entry.field("dt.value").is_none());
    }

    #[test]
    fn test_response_without_list() {
        let response: ForecastResponse =
            serde_json::from_str(r#"{"cod": "200", "cnt": 0}"#).unwrap();
        assert!(response.list.is_none());
    }

    #[test]
    fn test_response_with_list() {
        let response: ForecastResponse =
            serde_json::from_str(r#"{"list": [{"dt": 1}, {"dt": 2}], "city": {"name": "X"}}"#)
                .unwrap();
        let list = response.list.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].field("dt"), Some(&json!(2)));
    }
}
