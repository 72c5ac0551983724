//! Periodic runs for long-lived processes.

use std::future::Future;
use std::time::Duration;

use chrono::TimeZone;
use tokio::time::MissedTickBehavior;
use windwatch_forecast::ForecastClient;

use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::retry::{with_retry, RetryPolicy};

const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Totals for a [`watch`] session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub runs: usize,
    pub failed: usize,
}

/// [`ForecastClient::verify_reachable`] under `retry`.
///
/// Transient answers (5xx, 429, timeouts) are retried; a rejected key or an
/// unknown location fails on the first attempt.
pub async fn wait_until_reachable(
    client: &ForecastClient,
    retry: &RetryPolicy,
) -> Result<(), PipelineError> {
    with_retry(retry, || async {
        client.verify_reachable().await.map_err(PipelineError::from)
    })
    .await
}

/// Run `pipeline` now and then every `period` until `shutdown` resolves.
///
/// Each run is retried per `retry`. A run that still fails is logged and the
/// next tick proceeds as usual. An in-flight run is dropped on shutdown;
/// records it already upserted stay stored.
pub async fn watch<Tz, F>(
    pipeline: &Pipeline<'_, Tz>,
    period: Duration,
    retry: &RetryPolicy,
    shutdown: F,
) -> WatchSummary
where
    Tz: TimeZone,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period.max(MIN_PERIOD));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);
    let mut summary = WatchSummary::default();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            _ = &mut shutdown => break,
            result = with_retry(retry, || pipeline.run()) => {
                summary.runs += 1;
                if let Err(e) = result {
                    summary.failed += 1;
                    tracing::error!(
                        "Run failed ({} error): {}. Next attempt in {:?}",
                        e.kind(),
                        e.user_message(),
                        period
                    );
                }
            }
        }
    }

    tracing::info!("Stopped after {} runs ({} failed)", summary.runs, summary.failed);
    summary
}
