//! Forecast client error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    /// The provider answered with a non-success status.
    #[error("Server response is {status}. Please check your API key and the spelling of the location")]
    Status { status: u16 },

    /// The request never produced a response (DNS, refused, timeout, broken body).
    #[error("Connection failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body is not JSON or lacks the `list` field.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ForecastError {
    /// User-friendly error message for CLI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status: 401 } => {
                "The forecast provider rejected the API key.".to_string()
            }
            Self::Status { status: 404 } => {
                "The forecast provider does not know this location. Check its spelling.".to_string()
            }
            Self::Status { status } => format!("The forecast provider answered {}.", status),
            Self::Transport(_) => "Unable to reach the forecast provider. Check your connection.".to_string(),
            Self::MalformedResponse(_) => "The forecast provider sent an unexpected response.".to_string(),
            Self::InvalidEndpoint(_) => "The forecast base URL is invalid.".to_string(),
        }
    }

    /// Whether this is a connectivity failure (transport or HTTP status).
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Transport(_))
    }

    /// Whether a later attempt may succeed without changing anything.
    ///
    /// Timeouts, refused connections, 5xx, 408 and 429 are retryable; other
    /// 4xx statuses and malformed payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            Self::Transport(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                if e.is_request() {
                    return false;
                }
                e.status().is_some_and(|s| s.is_server_error())
            }
            Self::MalformedResponse(_) | Self::InvalidEndpoint(_) => false,
        }
    }
}
