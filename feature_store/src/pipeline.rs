//! Batch jobs wiring the provider, the feature builder and the store together.
//!
//! Each job runs once per invocation and expects exclusive use of the
//! database; overlapping runs must be prevented by whoever schedules them.

use std::{collections::HashSet, path::Path, slice};

use anyhow::Context;
use aqi_ingestor::{
    models::{reading::RawReading, request_params::HistoryRequestParams},
    providers::AirQualityProvider,
};
use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::PipelineConfig,
    csv_io,
    dataset::{TemporalSplit, TrainingExample, build_training_examples, temporal_split},
    dedup::{drop_persisted, merge_history},
    features::{FeatureRow, build_features, build_features_from_records},
    store::FeatureStore,
    training::{self, EvaluationReport, HorizonMeanForecaster, RollingMeanForecaster},
    tz::to_rfc3339_millis,
};

/// `engine_kv` key holding the completion time of the last hourly run.
pub const LAST_HOURLY_RUN_KEY: &str = "last_hourly_run";
/// `engine_kv` key holding the timestamp of the newest row written by any job.
pub const LAST_FEATURE_TS_KEY: &str = "last_feature_timestamp";

/// What an hourly run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HourlyOutcome {
    /// The provider returned no readings.
    NoNewData,
    /// Every fetched reading was already persisted.
    AlreadyIngested,
    /// Not enough stored history to build a row yet.
    InsufficientHistory {
        /// Readings available after merging history and fresh data.
        available: usize,
    },
    /// The newest feature row was written.
    Written {
        /// Its timestamp.
        timestamp: i64,
    },
    /// The newest feature row already existed.
    AlreadyPresent {
        /// Its timestamp.
        timestamp: i64,
    },
}

/// Counters of a backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Readings returned by the provider.
    pub fetched: usize,
    /// Fetched readings not yet in the store.
    pub new_readings: usize,
    /// Feature rows built from stored history plus new readings.
    pub rows_built: usize,
    /// Rows actually inserted.
    pub rows_written: usize,
}

/// Counters of a CSV seed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Records read from the file.
    pub records: usize,
    /// Feature rows built.
    pub rows_built: usize,
    /// Rows actually inserted.
    pub rows_written: usize,
}

fn history_as_readings(rows: Vec<FeatureRow>) -> Vec<RawReading> {
    rows.into_iter()
        .map(|r| RawReading::bare(r.timestamp, r.aqi))
        .collect()
}

fn record_last_written<S: FeatureStore>(
    store: &S,
    conn: &mut SqliteConnection,
    rows: &[FeatureRow],
) -> anyhow::Result<()> {
    if let Some(last) = rows.iter().map(|r| r.timestamp).max() {
        let previous = store
            .get_meta(conn, LAST_FEATURE_TS_KEY)?
            .and_then(|v| v.parse::<i64>().ok());
        if previous.is_none_or(|p| last > p) {
            store.set_meta(conn, LAST_FEATURE_TS_KEY, &last.to_string())?;
        }
    }
    Ok(())
}

/// Fetches current readings and persists the newest feature row they complete.
///
/// Every run that finishes without error stamps [`LAST_HOURLY_RUN_KEY`],
/// including runs that had nothing to write.
pub async fn run_hourly<S: FeatureStore>(
    cfg: &PipelineConfig,
    provider: &dyn AirQualityProvider,
    store: &S,
    conn: &mut SqliteConnection,
) -> anyhow::Result<HourlyOutcome> {
    let outcome = hourly_step(cfg, provider, store, conn).await?;
    store.set_meta(conn, LAST_HOURLY_RUN_KEY, &to_rfc3339_millis(Utc::now()))?;
    Ok(outcome)
}

async fn hourly_step<S: FeatureStore>(
    cfg: &PipelineConfig,
    provider: &dyn AirQualityProvider,
    store: &S,
    conn: &mut SqliteConnection,
) -> anyhow::Result<HourlyOutcome> {
    let fetched = provider
        .fetch_current(cfg.location)
        .await
        .context("fetching current readings")?;
    if fetched.is_empty() {
        info!("no new data");
        return Ok(HourlyOutcome::NoNewData);
    }

    let candidates: Vec<i64> = fetched.iter().map(|r| r.timestamp).collect();
    let persisted = store.existing_timestamps(conn, &candidates)?;
    let fresh = drop_persisted(fetched, &persisted);
    if fresh.is_empty() {
        info!(count = candidates.len(), "readings already ingested");
        return Ok(HourlyOutcome::AlreadyIngested);
    }

    let history = history_as_readings(store.read_latest(conn, cfg.ingest.history_limit)?);
    let merged = merge_history(history, fresh);
    let rows = build_features(&merged)?;

    let Some(latest) = rows.last() else {
        info!(available = merged.len(), "not enough history for lag features yet");
        return Ok(HourlyOutcome::InsufficientHistory {
            available: merged.len(),
        });
    };

    let written = store.insert_if_absent(conn, slice::from_ref(latest))?;

    if written == 0 {
        warn!(timestamp = latest.timestamp, "newest feature row already stored");
        return Ok(HourlyOutcome::AlreadyPresent {
            timestamp: latest.timestamp,
        });
    }
    record_last_written(store, conn, slice::from_ref(latest))?;
    info!(timestamp = latest.timestamp, aqi = latest.aqi, "feature row written");
    Ok(HourlyOutcome::Written {
        timestamp: latest.timestamp,
    })
}

/// Fetches `[start, end)` hour by hour and persists every feature row it completes.
///
/// When `archive` is given, the fetched readings are also written there as CSV.
pub async fn backfill<S: FeatureStore>(
    cfg: &PipelineConfig,
    provider: &dyn AirQualityProvider,
    store: &S,
    conn: &mut SqliteConnection,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    archive: Option<&Path>,
) -> anyhow::Result<BackfillReport> {
    let params = HistoryRequestParams {
        location: cfg.location,
        start,
        end,
    };
    let fetched = provider
        .fetch_history(params)
        .await
        .with_context(|| format!("fetching history {start} .. {end}"))?;

    if let Some(path) = archive {
        csv_io::write_readings_path(path, &fetched)?;
        info!(path = %path.display(), count = fetched.len(), "archived raw readings");
    }

    let candidates: Vec<i64> = fetched.iter().map(|r| r.timestamp).collect();
    let persisted = store.existing_timestamps(conn, &candidates)?;
    let fetched_len = fetched.len();
    let fresh = drop_persisted(fetched, &persisted);
    let new_readings = fresh.len();

    let mut report = BackfillReport {
        fetched: fetched_len,
        new_readings,
        ..Default::default()
    };
    if fresh.is_empty() {
        info!(fetched = fetched_len, "nothing new to backfill");
        return Ok(report);
    }

    // Stored rows are the only history we have; lags are positional over all of it.
    let history = history_as_readings(store.read_all(conn)?);
    let merged = merge_history(history, fresh);
    let rows = build_features(&merged)?;

    report.rows_built = rows.len();
    report.rows_written = store.insert_if_absent(conn, &rows)?;
    record_last_written(store, conn, &rows)?;

    info!(?report, "backfill finished");
    Ok(report)
}

/// Loads a raw-readings CSV and persists the feature rows it yields.
///
/// A record missing `timestamp` or `aqi` fails the whole file before anything
/// is written. Duplicate timestamps inside the file collapse to the first.
pub fn seed_from_csv<S: FeatureStore>(
    store: &S,
    conn: &mut SqliteConnection,
    path: &Path,
) -> anyhow::Result<SeedReport> {
    let mut records = csv_io::read_records_path(path)?;
    let total = records.len();

    let mut seen = HashSet::with_capacity(total);
    records.retain(|r| r.timestamp.is_none_or(|ts| seen.insert(ts)));
    if records.len() < total {
        warn!(dropped = total - records.len(), "duplicate timestamps in seed file");
    }

    let rows = build_features_from_records(records)
        .with_context(|| format!("building features from {}", path.display()))?;
    let rows_written = store.insert_if_absent(conn, &rows)?;
    record_last_written(store, conn, &rows)?;

    let report = SeedReport {
        records: total,
        rows_built: rows.len(),
        rows_written,
    };
    info!(?report, "seed finished");
    Ok(report)
}

/// Builds training examples from every stored row and splits them in time.
pub fn training_dataset<S: FeatureStore>(
    cfg: &PipelineConfig,
    store: &S,
    conn: &mut SqliteConnection,
) -> anyhow::Result<TemporalSplit<TrainingExample>> {
    let rows = store.read_all(conn)?;
    let examples = build_training_examples(&rows, cfg.training.horizon)?;
    info!(
        rows = rows.len(),
        examples = examples.len(),
        horizon = cfg.training.horizon,
        "built training examples"
    );
    let split = temporal_split(examples, cfg.training.test_fraction)
        .context("splitting training examples")?;
    Ok(split)
}

/// Writes train then test examples of `split` as one CSV design matrix.
pub fn export_dataset(
    split: &TemporalSplit<TrainingExample>,
    horizon: usize,
    path: &Path,
) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating dataset export {}", path.display()))?;
    let all: Vec<TrainingExample> = split.train.iter().chain(&split.test).cloned().collect();
    csv_io::write_dataset(file, &all, horizon)
}

/// Scores the baseline forecasters on the stored dataset.
pub fn evaluate_baselines<S: FeatureStore>(
    cfg: &PipelineConfig,
    store: &S,
    conn: &mut SqliteConnection,
) -> anyhow::Result<Vec<EvaluationReport>> {
    let split = training_dataset(cfg, store, conn)?;

    let mut reports = Vec::new();
    let mut rolling = RollingMeanForecaster::default();
    let mut horizon_mean = HorizonMeanForecaster::default();
    for model in [
        &mut rolling as &mut dyn training::Forecaster,
        &mut horizon_mean,
    ] {
        let report = training::evaluate(model, &split)?;
        info!(model = report.model, mae = report.mae, rmse = report.rmse, "evaluated");
        reports.push(report);
    }
    Ok(reports)
}
