use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable that overrides `forecast.api_key`.
pub const API_KEY_ENV: &str = "WINDWATCH_API_KEY";

const API_KEY_PLACEHOLDER: &str = "YOUR_OPENWEATHER_API_KEY";
const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Forecast provider settings
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Transformation settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Document store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Periodic run settings for `watch`
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// City name as understood by the provider (e.g. "Anapa")
    pub location: String,

    /// Provider credential. `WINDWATCH_API_KEY` takes precedence when set.
    pub api_key: Option<String>,

    /// Base URL of the provider API, without the `/forecast` path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Unit system requested from the provider
    #[serde(default = "default_units")]
    pub units: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            location: "London".to_string(),
            api_key: Some(API_KEY_PLACEHOLDER.to_string()),
            base_url: default_base_url(),
            units: default_units(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ForecastConfig {
    /// Check if a real credential is configured (not empty, not the placeholder)
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty() && k != API_KEY_PLACEHOLDER)
    }

    /// The credential to send, or `MissingSetting` if none is configured.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref() {
            Some(key) if self.has_api_key() => Ok(key),
            _ => Err(ConfigError::MissingSetting(format!(
                "forecast.api_key (or {})",
                API_KEY_ENV
            ))),
        }
    }
}

/// What to do with a forecast entry that lacks a required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedEntryPolicy {
    /// Abort the whole run on the first malformed entry
    #[default]
    Fail,
    /// Log the entry, drop it and keep going
    Skip,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub malformed_entries: MalformedEntryPolicy,

    /// IANA timezone used as "local time". System local time when unset.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl PipelineConfig {
    /// Parse the configured timezone, if any.
    pub fn timezone(&self) -> Result<Option<chrono_tz::Tz>, ConfigError> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<chrono_tz::Tz>()
                    .map_err(|_| ConfigError::UnknownTimezone(name.to_string()))
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file holding the forecast documents
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("windwatch")
        .join("forecast.db")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Minutes between pipeline runs (provider publishes 3-hourly slots)
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u32,

    /// Retries of a failed run before waiting for the next tick
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay; doubles per attempt
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound for the backoff delay
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_refresh_minutes() -> u32 {
    180
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    2_000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_minutes: default_refresh_minutes(),
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location when `None`.
    ///
    /// A missing file is created with default contents. `WINDWATCH_API_KEY`
    /// overrides the file's credential.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::info!("Writing default configuration to {}", config_path.display());
            let config = Self::default();
            config.save_to(&config_path)?;
            config
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.forecast.api_key = Some(key);
            }
        }

        Ok(config)
    }

    /// Load and validate, failing on errors and logging warnings.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = Self::load(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Read and parse a config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Ok(Self::from_toml_str(&contents)?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.forecast.base_url, "forecast.base_url", &mut result);

        if self.forecast.location.trim().is_empty() {
            result.add_error("forecast.location", "Location must not be empty");
        }

        if !self.forecast.has_api_key() {
            result.add_warning(
                "forecast.api_key",
                format!("No API key configured - set it here or via {}", API_KEY_ENV),
            );
        }

        if self.forecast.timeout_secs == 0 {
            result.add_error("forecast.timeout_secs", "Timeout must be greater than 0");
        } else if self.forecast.timeout_secs > 300 {
            result.add_warning("forecast.timeout_secs", "Timeout is unusually long (>300s)");
        }

        if let Err(e) = self.pipeline.timezone() {
            result.add_error("pipeline.timezone", e.to_string());
        }

        if self.store.path.is_dir() {
            result.add_error(
                "store.path",
                format!("Path is a directory: {}", self.store.path.display()),
            );
        }

        if self.schedule.refresh_minutes == 0 {
            result.add_error(
                "schedule.refresh_minutes",
                "Refresh interval must be greater than 0",
            );
        } else if self.schedule.refresh_minutes > 1440 {
            result.add_warning(
                "schedule.refresh_minutes",
                "Refresh interval is more than 24 hours",
            );
        }

        if self.schedule.max_delay_ms < self.schedule.initial_delay_ms {
            result.add_warning(
                "schedule.max_delay_ms",
                "Max retry delay is below the initial delay; every retry waits max_delay_ms",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        std::fs::write(path, self.to_toml_string()?).context("Failed to write config file")?;

        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// A copy with the credential masked, safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.forecast.has_api_key() {
            copy.forecast.api_key = Some("***".to_string());
        }
        copy
    }

    /// `<config_dir>/windwatch/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("windwatch");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_placeholder_api_key_is_warning() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.warnings.iter().any(|w| w.field == "forecast.api_key"));
        assert!(matches!(
            config.forecast.api_key(),
            Err(ConfigError::MissingSetting(_))
        ));
    }

    #[test]
    fn test_api_key_returned_when_configured() {
        let mut config = Config::default();
        config.forecast.api_key = Some("abc123".to_string());
        assert_eq!(config.forecast.api_key().unwrap(), "abc123");
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let mut config = Config::default();
        config.forecast.api_key = Some("   ".to_string());
        assert!(config.forecast.api_key().is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.forecast.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "forecast.base_url"));
    }

    #[test]
    fn test_invalid_base_url_scheme() {
        let mut config = Config::default();
        config.forecast.base_url = "ftp://api.example.com".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_empty_location() {
        let mut config = Config::default();
        config.forecast.location = " ".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "forecast.location"));
    }

    #[test]
    fn test_zero_refresh_interval() {
        let mut config = Config::default();
        config.schedule.refresh_minutes = 0;
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_unknown_timezone() {
        let mut config = Config::default();
        config.pipeline.timezone = Some("Mars/Olympus".to_string());
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "pipeline.timezone"));
    }

    #[test]
    fn test_known_timezone_parses() {
        let pipeline = PipelineConfig {
            malformed_entries: MalformedEntryPolicy::Fail,
            timezone: Some("Europe/Moscow".to_string()),
        };
        assert_eq!(pipeline.timezone().unwrap(), Some(chrono_tz::Europe::Moscow));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [forecast]
            location = "Anapa"
            api_key = "k"

            [pipeline]
            malformed_entries = "skip"
            "#,
        )
        .unwrap();

        assert_eq!(config.forecast.location, "Anapa");
        assert_eq!(config.forecast.units, "metric");
        assert_eq!(config.forecast.timeout_secs, 30);
        assert_eq!(config.pipeline.malformed_entries, MalformedEntryPolicy::Skip);
        assert_eq!(config.schedule.refresh_minutes, 180);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = Config::from_toml_str("[forecast\nlocation = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.forecast.location = "Tarifa".to_string();
        config.pipeline.timezone = Some("Europe/Madrid".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.forecast.location, "Tarifa");
        assert_eq!(loaded.pipeline.timezone.as_deref(), Some("Europe/Madrid"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_redacted_masks_key() {
        let mut config = Config::default();
        config.forecast.api_key = Some("0123456789abcdef".to_string());

        let shown = config.redacted().to_toml_string().unwrap();
        assert!(!shown.contains("0123456789abcdef"));
        assert!(shown.contains("***"));
        assert_eq!(config.forecast.api_key.as_deref(), Some("0123456789abcdef"));
    }

    #[test]
    fn test_load_validated_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[forecast]\nlocation = \"  \"\n").unwrap();

        let err = Config::load_validated(Some(&path)).unwrap_err();
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::Invalid(summary)) => assert!(summary.contains("forecast.location")),
            other => panic!("expected invalid config, got {:?}", other),
        }
    }
}
