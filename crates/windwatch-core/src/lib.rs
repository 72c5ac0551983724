//! Shared configuration, error types and logging setup for windwatch.

pub mod config;
pub mod error;

pub use config::{
    Config, ForecastConfig, MalformedEntryPolicy, PipelineConfig, ScheduleConfig, StoreConfig,
    ValidationResult,
};
pub use error::ConfigError;

use anyhow::Result;

/// Initialize tracing output.
///
/// Honors `RUST_LOG`; falls back to `info` when it is unset or unparsable.
pub fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("windwatch logging initialized");
    Ok(())
}
