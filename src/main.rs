//! CLI entry point for the AAA rater.
//!
//! Provides subcommands for rating every sector, index and the whole universe,
//! rating a single source table, and checking that the engine is healthy.

use aaa_rater::calculator::{AaaCalculator, Calculator, calculate_and_save};
use aaa_rater::fetch::BasicClient;
use aaa_rater::fetch::auth::ApiKey;
use aaa_rater::infra::http::HttpSource;
use aaa_rater::infra::local::{LocalBackup, LocalCsvSaver, LocalCsvSource};
use aaa_rater::infra::s3::{S3Backup, S3Location, S3Saver, S3Source};
use aaa_rater::output::print_json;
use aaa_rater::scoring::{ScoringEngine, ScoringWeights};
use aaa_rater::services::{DataBackup, DataSaver, DataSource};
use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aaa_rater")]
#[command(about = "Computes AAA letter-grade ratings from fundamental metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rate every sector, every market-cap index and the whole universe
    Run {
        #[command(flatten)]
        io: IoArgs,

        /// Comma-separated sectors to rate instead of the default list
        #[arg(long, value_delimiter = ',')]
        sectors: Option<Vec<String>>,
    },
    /// Rate a single source table
    Grade {
        /// Source identifier, e.g. "AAA - energy.csv"
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Destination identifier, e.g. "AAA_energy"
        #[arg(value_name = "DESTINATION")]
        destination: String,

        #[command(flatten)]
        io: IoArgs,

        /// Log the graded table as JSON instead of saving it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Check that the scoring engine can run
    Health {
        /// Optional JSON file overriding category and overall weights
        #[arg(long)]
        weights: Option<String>,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Directory holding source CSV files
    #[arg(short, long, default_value = "data")]
    input_dir: String,

    /// Base URL to fetch source CSV files from (overrides --input-dir).
    /// AAA_SOURCE_API_KEY, if set, is sent as a bearer token
    #[arg(long)]
    source_url: Option<String>,

    /// S3 bucket to read source CSV files from (overrides --input-dir)
    #[arg(long)]
    s3_source_bucket: Option<String>,

    /// Key prefix of source objects in --s3-source-bucket
    #[arg(long, default_value = "")]
    s3_source_prefix: String,

    /// Directory to write rated CSV files to
    #[arg(short, long, default_value = "ratings")]
    output_dir: String,

    /// Directory to copy previous results to before overwriting
    #[arg(short, long, default_value = "backups")]
    backup_dir: String,

    /// S3 bucket to upload results to (overrides --output-dir and --backup-dir)
    #[arg(long)]
    s3_bucket: Option<String>,

    /// Key prefix for results in --s3-bucket
    #[arg(long, default_value = "")]
    s3_prefix: String,

    /// Gzip compress result files
    #[arg(long, default_value_t = false)]
    gzip: bool,

    /// Optional JSON file overriding category and overall weights
    #[arg(long)]
    weights: Option<String>,
}

/// Collaborators selected from the command line.
struct Collaborators {
    source: Box<dyn DataSource>,
    saver: Box<dyn DataSaver>,
    backup: Box<dyn DataBackup>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Keep the guard alive so buffered log lines are flushed on exit
    let _file_guard = init_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { io, sectors } => {
            let calculator = AaaCalculator::new(load_engine(io.weights.as_deref())?);
            let collaborators = build_collaborators(&io).await?;

            let errors = calculator
                .run_complete_calculation(
                    collaborators.source.as_ref(),
                    collaborators.saver.as_ref(),
                    collaborators.backup.as_ref(),
                    sectors.as_deref(),
                )
                .await;

            for e in &errors {
                error!(error = %e, "Item failed");
            }
            if !errors.is_empty() {
                return Err(anyhow!("{} item(s) failed", errors.len()));
            }
        }
        Commands::Grade {
            source,
            destination,
            io,
            dry_run,
        } => {
            let engine = load_engine(io.weights.as_deref())?;
            let collaborators = build_collaborators(&io).await?;

            if dry_run {
                let raw = collaborators.source.get_data(&source).await?;
                if raw.height() == 0 || raw.width() == 0 {
                    return Err(anyhow!("no data found for '{source}'"));
                }
                print_json(&mut engine.grade_table(raw)?)?;
            } else {
                let ok = calculate_and_save(
                    &engine,
                    collaborators.source.as_ref(),
                    collaborators.saver.as_ref(),
                    collaborators.backup.as_ref(),
                    &source,
                    &destination,
                )
                .await;
                if !ok {
                    return Err(anyhow!("rating '{source}' into '{destination}' failed"));
                }
            }
        }
        Commands::Health { weights } => {
            let calculator = AaaCalculator::new(load_engine(weights.as_deref())?);
            if !calculator.health_check() {
                return Err(anyhow!("{} is not healthy", calculator.name()));
            }
            info!(calculator = calculator.name(), "Healthy");
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/aaa_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aaa_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

fn load_engine(weights: Option<&str>) -> Result<ScoringEngine> {
    let weights = match weights {
        Some(path) => {
            info!(path, "Loading scoring weights");
            ScoringWeights::load(path)?
        }
        None => ScoringWeights::default(),
    };
    Ok(ScoringEngine::new(weights))
}

async fn build_collaborators(io: &IoArgs) -> Result<Collaborators> {
    let needs_aws = io.s3_bucket.is_some() || io.s3_source_bucket.is_some();
    let s3 = if needs_aws {
        let config = aws_config::load_from_env().await;
        Some(aws_sdk_s3::Client::new(&config))
    } else {
        None
    };

    let source: Box<dyn DataSource> = match (&io.source_url, &io.s3_source_bucket, &s3) {
        (Some(url), _, _) => {
            info!(url = %url, "Reading sources over HTTP");
            match std::env::var("AAA_SOURCE_API_KEY") {
                Ok(key) => Box::new(HttpSource::new(
                    ApiKey::bearer(BasicClient::new()?, &key)?,
                    url,
                )?),
                Err(_) => Box::new(HttpSource::new(BasicClient::new()?, url)?),
            }
        }
        (None, Some(bucket), Some(client)) => {
            info!(bucket = %bucket, "Reading sources from S3");
            Box::new(S3Source::new(
                client.clone(),
                S3Location::new(bucket.as_str(), io.s3_source_prefix.as_str()),
            ))
        }
        _ => {
            info!(dir = %io.input_dir, "Reading sources from local directory");
            Box::new(LocalCsvSource::new(&io.input_dir))
        }
    };

    let (saver, backup): (Box<dyn DataSaver>, Box<dyn DataBackup>) = match (&io.s3_bucket, &s3) {
        (Some(bucket), Some(client)) => {
            info!(bucket = %bucket, gzip = io.gzip, "Uploading results to S3");
            let location = S3Location::new(bucket.as_str(), io.s3_prefix.as_str());
            (
                Box::new(S3Saver::new(client.clone(), location.clone(), io.gzip)) as Box<dyn DataSaver>,
                Box::new(S3Backup::new(client.clone(), location, io.gzip)) as Box<dyn DataBackup>,
            )
        }
        _ => {
            info!(dir = %io.output_dir, gzip = io.gzip, "Writing results to local directory");
            (
                Box::new(LocalCsvSaver::new(&io.output_dir, io.gzip)) as Box<dyn DataSaver>,
                Box::new(LocalBackup::new(&io.output_dir, &io.backup_dir, io.gzip))
                    as Box<dyn DataBackup>,
            )
        }
    };

    Ok(Collaborators {
        source,
        saver,
        backup,
    })
}
