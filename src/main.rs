//! CLI entry point for the fatigue report aggregator.
//!
//! Provides subcommands for aggregating a directory of submission CSVs into
//! the dashboard summary and for checking a single submission file.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use fatigue_aggregator::analyzers::analyzer::{aggregate_dir, check_file};
use fatigue_aggregator::output::{print_json, print_pretty, write_summary};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fatigue_aggregator")]
#[command(about = "Aggregate anonymous fatigue reports into a dashboard summary", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate every submission CSV into the summary JSON
    Aggregate {
        /// Directory containing submission CSVs
        #[arg(short = 'd', long, env = "SUBMISSIONS_DIR", default_value = "submissions")]
        submissions_dir: PathBuf,

        /// Summary JSON file to write
        #[arg(short, long, env = "SUMMARY_OUTPUT", default_value = "data/data.json")]
        output: PathBuf,

        /// Leave `updated_at` out so repeated runs produce identical bytes
        #[arg(long, env = "SUMMARY_NO_TIMESTAMP", default_value_t = false)]
        no_timestamp: bool,
    },
    /// Validate a single submission CSV and log its summary without writing anything
    Check {
        /// Path to the submission CSV
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let _file_guard = init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate {
            submissions_dir,
            output,
            no_timestamp,
        } => {
            let (summary, _report) = aggregate_dir(&submissions_dir)?;
            let summary = if no_timestamp {
                summary
            } else {
                summary.with_timestamp(Utc::now())
            };

            print_pretty(&summary);
            write_summary(&output, &summary)?;

            info!(output = %output.display(), count = summary.overall.count, "Summary written");
            println!(
                "Aggregated {} submissions into {}",
                summary.overall.count,
                output.display()
            );
        }
        Commands::Check { file } => {
            let (summary, parsed) = check_file(&file)?;
            print_json(&summary)?;
            info!(
                file = %file.display(),
                accepted = parsed.rows.len(),
                rejected = parsed.rejected.len(),
                "Submission file checked"
            );
        }
    }

    Ok(())
}

/// Logging setup: colored stderr, plus a JSON rolling log file when
/// `LOG_FILE_PATH` is set. The returned guard must outlive the program's logging.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        );

    let (json_layer, guard) = match std::env::var("LOG_FILE_PATH") {
        Ok(log_file_path) => {
            let path = Path::new(&log_file_path);
            let log_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("logs"));
            let log_file_name = path
                .file_name()
                .unwrap_or(OsStr::new("fatigue_aggregator.log"));

            let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking_file)
                .with_filter(
                    EnvFilter::builder()
                        .with_env_var("RUST_LOG_JSON")
                        .with_default_directive(LevelFilter::DEBUG.into())
                        .from_env_lossy(),
                );
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    guard
}
