mod cli;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use clap::Parser;

use cli::{Cli, Command};
use windwatch_core::{Config, ConfigError, ScheduleConfig};
use windwatch_forecast::{ClientOptions, ForecastClient};
use windwatch_pipeline::{wait_until_reachable, watch, Pipeline, PipelineError, RetryPolicy};
use windwatch_store::{ForecastStore, SqliteForecastStore, StoredRecord};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    windwatch_core::init_logging()?;

    let (config, _) = Config::load_validated(cli.config.as_deref()).map_err(config_failure)?;

    match cli.command {
        Command::Check => check(&config).await,
        Command::Run { dry_run } => run(&config, dry_run).await,
        Command::Watch => run_watch(&config).await,
        Command::Show { limit } => show(&config, limit),
        Command::Config => print_config(&config, cli.config.as_deref()),
    }
}

fn build_client(config: &Config) -> Result<ForecastClient> {
    let forecast = &config.forecast;
    let options = ClientOptions {
        base_url: forecast.base_url.clone(),
        units: forecast.units.clone(),
        timeout: Duration::from_secs(forecast.timeout_secs),
    };
    Ok(ForecastClient::with_options(
        &forecast.location,
        forecast.api_key().map_err(|e| config_failure(e.into()))?,
        options,
    )?)
}

fn open_store(config: &Config) -> Result<SqliteForecastStore> {
    let path = &config.store.path;
    SqliteForecastStore::open(path)
        .with_context(|| format!("Failed to open forecast store at {}", path.display()))
}

/// Put the display message of a [`ConfigError`] in front of its details.
fn config_failure(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<ConfigError>().map(ConfigError::user_message) {
        Some(message) => err.context(message),
        None => err,
    }
}

/// Attach the display message and failure class to a pipeline error.
fn pipeline_failure(err: PipelineError) -> anyhow::Error {
    let summary = format!("{} ({} error)", err.user_message(), err.kind());
    anyhow::Error::new(err).context(summary)
}

async fn check(config: &Config) -> Result<()> {
    let client = build_client(config)?;
    client
        .verify_reachable()
        .await
        .map_err(|e| pipeline_failure(e.into()))?;
    println!("{}: forecast provider reachable", client.location());
    Ok(())
}

async fn run(config: &Config, dry_run: bool) -> Result<()> {
    let client = build_client(config)?;
    client
        .verify_reachable()
        .await
        .map_err(|e| pipeline_failure(e.into()))?;
    let store = open_store(config)?;

    match config.pipeline.timezone().map_err(|e| config_failure(e.into()))? {
        Some(tz) => run_in(config, &client, &store, tz, dry_run).await,
        None => run_in(config, &client, &store, Local, dry_run).await,
    }
}

async fn run_in<Tz: TimeZone>(
    config: &Config,
    client: &ForecastClient,
    store: &dyn ForecastStore,
    tz: Tz,
    dry_run: bool,
) -> Result<()> {
    let pipeline =
        Pipeline::new(client, store, tz).with_policy(config.pipeline.malformed_entries);

    if dry_run {
        let prepared = pipeline.prepare().await.map_err(pipeline_failure)?;
        for record in &prepared.records {
            println!("{}", format_record(&StoredRecord::from(record)));
        }
        println!(
            "{} of {} slots in window, nothing written",
            prepared.records.len(),
            prepared.fetched
        );
        return Ok(());
    }

    let report = pipeline.run().await.map_err(pipeline_failure)?;
    println!(
        "{} slots stored ({} new, {} updated)",
        report.kept, report.persisted.inserted, report.persisted.updated
    );
    Ok(())
}

async fn run_watch(config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let retry = RetryPolicy::from(&config.schedule);
    wait_until_reachable(&client, &retry)
        .await
        .map_err(pipeline_failure)?;
    let store = open_store(config)?;
    let policy = config.pipeline.malformed_entries;

    match config.pipeline.timezone().map_err(|e| config_failure(e.into()))? {
        Some(tz) => {
            let pipeline = Pipeline::new(&client, &store, tz).with_policy(policy);
            watch_until_ctrl_c(&pipeline, &config.schedule, &retry).await;
        }
        None => {
            let pipeline = Pipeline::new(&client, &store, Local).with_policy(policy);
            watch_until_ctrl_c(&pipeline, &config.schedule, &retry).await;
        }
    }
    Ok(())
}

async fn watch_until_ctrl_c<Tz: TimeZone>(
    pipeline: &Pipeline<'_, Tz>,
    schedule: &ScheduleConfig,
    retry: &RetryPolicy,
) {
    let period = Duration::from_secs(u64::from(schedule.refresh_minutes) * 60);
    tracing::info!("Refreshing every {} minutes, Ctrl-C to stop", schedule.refresh_minutes);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl-C: {}", e);
        }
    };
    watch(pipeline, period, retry, shutdown).await;
}

fn show(config: &Config, limit: Option<usize>) -> Result<()> {
    let store = open_store(config)?;
    let records = store.list().map_err(|e| pipeline_failure(e.into()))?;

    if records.is_empty() {
        println!("No forecast stored yet. Run `windwatch run` first.");
        return Ok(());
    }

    let shown = limit.unwrap_or(records.len());
    for record in records.iter().take(shown) {
        println!("{}", format_record(record));
    }
    if shown < records.len() {
        println!("... {} more", records.len() - shown);
    }
    Ok(())
}

fn format_record(record: &StoredRecord) -> String {
    format!(
        "{:<12} {:>6.1}°  {:>3}%  {:>5.1} wind from {:>3}°",
        record.datetime_str.replace('\n', " "),
        record.temperature,
        record.humidity,
        record.wind_speed,
        record.wind_degree
    )
}

fn print_config(config: &Config, path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_path()?,
    };
    println!("# {}", path.display());
    print!("{}", config.redacted().to_toml_string()?);
    Ok(())
}
