use std::path::PathBuf;

use anyhow::{Context, Result};
use aqi_ingestor::providers::openweather::OpenWeatherProvider;
use clap::{Parser, Subcommand, ValueEnum};
use feature_store::{
    config::PipelineConfig,
    db::{connection::connect_sqlite, migrate},
    pipeline,
    store::{FeatureStore, SqliteFeatureStore},
    tz::{self, DstPolicy},
};
use tracing::info;

#[derive(Parser)]
#[command(version, about = "AQI feature pipeline")]
struct Cli {
    /// TOML config file; defaults apply when omitted.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply pending schema migrations.
    Migrate,
    /// Fetch current readings and store the newest feature row.
    Hourly,
    /// Fetch a historical range and store every feature row it completes.
    Backfill {
        /// Range start (RFC 3339, or local time in --tz).
        #[arg(long)]
        start: String,
        /// Range end, exclusive.
        #[arg(long)]
        end: String,
        /// IANA zone for naive boundaries.
        #[arg(long, default_value = "Asia/Karachi")]
        tz: String,
        /// How to resolve wall times repeated by a DST change.
        #[arg(long, value_enum, default_value_t = DstArg::Strict)]
        dst: DstArg,
        /// Also write the fetched raw readings to this CSV file.
        #[arg(long, value_name = "FILE")]
        archive: Option<PathBuf>,
    },
    /// Build and store feature rows from a raw-readings CSV.
    Seed {
        #[arg(long, value_name = "FILE")]
        csv: PathBuf,
    },
    /// Assemble the training dataset and report its split.
    Dataset {
        /// Write the design matrix (features + targets) to this CSV file.
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
    /// Score the baseline forecasters on the held-out suffix.
    Evaluate,
}

#[derive(Clone, Copy, ValueEnum)]
enum DstArg {
    Strict,
    Earliest,
    Latest,
}

impl From<DstArg> for DstPolicy {
    fn from(arg: DstArg) -> Self {
        match arg {
            DstArg::Strict => DstPolicy::Strict,
            DstArg::Earliest => DstPolicy::PreferEarliest,
            DstArg::Latest => DstPolicy::PreferLatest,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feature_store=info,aqi_ingestor=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = PipelineConfig::load(cli.config.as_deref()).context("loading configuration")?;

    migrate::run_all(&cfg.database_url)?;
    let mut conn = connect_sqlite(&cfg.database_url)?;
    let store = SqliteFeatureStore::new();

    match cli.cmd {
        Cmd::Migrate => {
            info!(rows = store.count(&mut conn)?, "schema up to date");
        }
        Cmd::Hourly => {
            let provider = OpenWeatherProvider::new(cfg.provider_config()?)?;
            let outcome = pipeline::run_hourly(&cfg, &provider, &store, &mut conn).await?;
            println!("{outcome:?}");
        }
        Cmd::Backfill {
            start,
            end,
            tz: tz_name,
            dst,
            archive,
        } => {
            let zone = tz::parse_tz(&tz_name)?;
            let start = tz::parse_boundary(&start, zone, dst.into())?;
            let end = tz::parse_boundary(&end, zone, dst.into())?;
            if start >= end {
                anyhow::bail!("--start must be before --end ({start} >= {end})");
            }

            let provider = OpenWeatherProvider::new(cfg.provider_config()?)?;
            let report = pipeline::backfill(
                &cfg,
                &provider,
                &store,
                &mut conn,
                start,
                end,
                archive.as_deref(),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Cmd::Seed { csv } => {
            let report = pipeline::seed_from_csv(&store, &mut conn, &csv)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Cmd::Dataset { export } => {
            let split = pipeline::training_dataset(&cfg, &store, &mut conn)?;
            info!(
                stored = store.count(&mut conn)?,
                train = split.train.len(),
                test = split.test.len(),
                "dataset ready"
            );
            if let Some(path) = export {
                pipeline::export_dataset(&split, cfg.training.horizon, &path)?;
                info!(path = %path.display(), "dataset exported");
            }
            println!("train={} test={}", split.train.len(), split.test.len());
        }
        Cmd::Evaluate => {
            let reports = pipeline::evaluate_baselines(&cfg, &store, &mut conn)?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    Ok(())
}
