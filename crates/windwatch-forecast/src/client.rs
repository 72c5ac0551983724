//! HTTP client for the provider's `/forecast` endpoint.

use std::fmt;
use std::time::Duration;

use tracing::instrument;
use url::Url;

use crate::error::ForecastError;
use crate::types::{ForecastResponse, RawForecastEntry};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "windwatch/0.1.0";

/// Transport settings for [`ForecastClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API root without the `/forecast` path
    pub base_url: String,
    /// Unit system requested from the provider
    pub units: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            units: "metric".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Forecast client bound to one location and credential.
///
/// The endpoint is built once at construction. Nothing is sent until
/// [`verify_reachable`](Self::verify_reachable) or
/// [`fetch_forecast_entries`](Self::fetch_forecast_entries) is called, and
/// each call makes exactly one attempt.
pub struct ForecastClient {
    client: reqwest::Client,
    endpoint: Url,
    location: String,
}

impl ForecastClient {
    pub fn new(location: &str, api_key: &str) -> Result<Self, ForecastError> {
        Self::with_options(location, api_key, ClientOptions::default())
    }

    /// Client against a different API root (mirrors, mock servers).
    pub fn with_base_url(
        base_url: &str,
        location: &str,
        api_key: &str,
    ) -> Result<Self, ForecastError> {
        let options = ClientOptions {
            base_url: base_url.to_string(),
            ..ClientOptions::default()
        };
        Self::with_options(location, api_key, options)
    }

    pub fn with_options(
        location: &str,
        api_key: &str,
        options: ClientOptions,
    ) -> Result<Self, ForecastError> {
        let endpoint = Self::build_endpoint(&options.base_url, location, api_key, &options.units)?;

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            location: location.to_string(),
        })
    }

    /// `{base}/forecast?q={location}&units={units}&appid={key}`
    fn build_endpoint(
        base_url: &str,
        location: &str,
        api_key: &str,
        units: &str,
    ) -> Result<Url, ForecastError> {
        let raw = format!("{}/forecast", base_url.trim_end_matches('/'));
        let url = Url::parse_with_params(
            &raw,
            &[("q", location), ("units", units), ("appid", api_key)],
        )
        .map_err(|e| ForecastError::InvalidEndpoint(format!("{}: {}", raw, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ForecastError::InvalidEndpoint(format!(
                "unsupported scheme {}",
                url.scheme()
            )));
        }

        Ok(url)
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// The endpoint with the credential masked, for logs and error output.
    pub fn redacted_endpoint(&self) -> String {
        let mut url = self.endpoint.clone();
        let pairs: Vec<(String, String)> = self
            .endpoint
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "appid" { "***".to_string() } else { v.into_owned() };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }

    /// Check that the provider accepts this location and credential.
    ///
    /// Succeeds only on a 2xx status. Callers should run this before relying
    /// on [`fetch_forecast_entries`](Self::fetch_forecast_entries).
    #[instrument(skip(self), fields(location = %self.location), level = "info")]
    pub async fn verify_reachable(&self) -> Result<(), ForecastError> {
        let response = self.client.get(self.endpoint.clone()).send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::info!("Forecast provider reachable ({})", status);
            Ok(())
        } else {
            tracing::warn!("Forecast provider answered {} for {}", status, self.redacted_endpoint());
            Err(ForecastError::Status {
                status: status.as_u16(),
            })
        }
    }

    /// Fetch the raw forecast entries, in provider order.
    #[instrument(skip(self), fields(location = %self.location), level = "info")]
    pub async fn fetch_forecast_entries(&self) -> Result<Vec<RawForecastEntry>, ForecastError> {
        let response = self.client.get(self.endpoint.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!("Forecast request failed with {}", status);
            return Err(ForecastError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: ForecastResponse = serde_json::from_str(&body)
            .map_err(|e| ForecastError::MalformedResponse(format!("JSON parse error: {}", e)))?;

        let entries = parsed.list.ok_or_else(|| {
            ForecastError::MalformedResponse("response has no `list` field".to_string())
        })?;

        tracing::debug!("Fetched {} forecast entries", entries.len());
        Ok(entries)
    }
}

impl fmt::Debug for ForecastClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastClient")
            .field("location", &self.location)
            .field("endpoint", &self.redacted_endpoint())
            .finish()
    }
}
