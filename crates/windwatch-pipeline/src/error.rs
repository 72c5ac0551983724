//! Pipeline error types.

use std::fmt;

use thiserror::Error;
use windwatch_forecast::ForecastError;
use windwatch_store::StoreError;

/// The four failure classes a run can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure or non-success HTTP status
    Connectivity,
    /// Response body lacks the forecast list
    MalformedResponse,
    /// A forecast entry lacks a required field
    MalformedEntry,
    /// The store is unreachable or refused a write
    Persistence,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::MalformedResponse => "malformed response",
            ErrorKind::MalformedEntry => "malformed entry",
            ErrorKind::Persistence => "persistence",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("Malformed forecast entry #{index}: `{field}` {reason}")]
    MalformedEntry {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl PipelineError {
    pub(crate) fn malformed(index: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedEntry {
            index,
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Forecast(ForecastError::MalformedResponse(_)) => ErrorKind::MalformedResponse,
            Self::Forecast(_) => ErrorKind::Connectivity,
            Self::MalformedEntry { .. } => ErrorKind::MalformedEntry,
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Forecast(e) => e.user_message(),
            Self::MalformedEntry { field, .. } => {
                format!("The forecast contained an entry without a usable `{}`.", field)
            }
            Self::Persistence(e) => e.user_message().to_string(),
        }
    }

    /// Whether re-running the pipeline later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Forecast(e) => e.is_retryable(),
            Self::MalformedEntry { .. } => false,
            Self::Persistence(e) => e.is_retryable(),
        }
    }
}
