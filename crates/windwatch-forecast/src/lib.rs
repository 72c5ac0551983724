//! OpenWeatherMap 5-day/3-hour forecast client.
//!
//! Returns the provider's forecast entries untouched; turning them into
//! records is the pipeline's job.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientOptions, ForecastClient, DEFAULT_BASE_URL};
pub use error::ForecastError;
pub use types::RawForecastEntry;
