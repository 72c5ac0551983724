//! Forecast ingestion pipeline.
//!
//! Linear, whole-list stages:
//! fetch → [`extract`] → [`filter_daylight`] → [`normalize`] → [`persist`].
//! Only the first and last touch the outside world.

pub mod daylight;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod persist;
pub mod pipeline;
pub mod record;
pub mod retry;
pub mod schedule;

pub use daylight::{filter_daylight, is_daylight};
pub use error::{ErrorKind, PipelineError};
pub use extract::{extract, extract_with_policy, Extraction};
pub use normalize::{normalize, round_one_decimal};
pub use persist::{persist, PersistSummary};
pub use pipeline::{transform, Pipeline, Prepared, RunReport};
pub use record::NormalizedRecord;
pub use retry::{with_retry, RetryPolicy};
pub use schedule::{wait_until_reachable, watch, WatchSummary};
pub use windwatch_core::MalformedEntryPolicy;
