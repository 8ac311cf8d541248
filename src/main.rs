//! CLI entry point for the inspection rater.
//!
//! Loads raw restaurant-inspection rows from CSV, runs the cleaning pipeline,
//! and writes the graded rows and per-inspection aggregates.

use anyhow::Result;
use clap::{Parser, Subcommand};
use inspection_rater::cleaning::grade::compute_grade;
use inspection_rater::cleaning::pipeline::{CleanedData, clean_data};
use inspection_rater::config::PipelineConfig;
use inspection_rater::loader::load_rows;
use inspection_rater::output::{print_report, write_aggregated_json, write_graded_csv};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "inspection_rater")]
#[command(about = "Clean, grade and aggregate restaurant inspection records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and write graded rows and aggregated inspections
    Clean {
        /// Raw inspection CSV (optionally .gz)
        #[arg(short, long)]
        input: String,

        /// CSV file for the graded, ungrouped rows
        #[arg(short, long, default_value = "graded.csv")]
        graded_output: String,

        /// JSON file for the one-row-per-inspection table
        #[arg(short, long, default_value = "aggregated.json")]
        aggregated_output: String,

        /// Optional JSON file overriding pipeline constants
        #[arg(short, long)]
        config: Option<String>,

        /// Gzip compress the graded CSV
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Run the pipeline and log stage counts without writing files
    Summarize {
        /// Raw inspection CSV (optionally .gz)
        #[arg(short, long)]
        input: String,

        /// Optional JSON file overriding pipeline constants
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Print the letter grade for a single score
    Grade {
        #[arg(value_name = "SCORE", allow_negative_numbers = true)]
        score: f64,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/inspection_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("inspection_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

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

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            input,
            graded_output,
            aggregated_output,
            config,
            gzip,
        } => {
            let cleaned = run(&input, config)?;

            write_graded_csv(&graded_output, &cleaned.graded, gzip)?;
            write_aggregated_json(&aggregated_output, &cleaned.aggregated)?;
            print_report(&cleaned.report)?;
        }
        Commands::Summarize { input, config } => {
            let cleaned = run(&input, config)?;

            let mut distribution: BTreeMap<&str, usize> = BTreeMap::new();
            for inspection in &cleaned.aggregated {
                *distribution
                    .entry(inspection.computed_grade.as_str())
                    .or_default() += 1;
            }
            let without_violations = cleaned
                .aggregated
                .iter()
                .filter(|i| i.violation_codes.is_empty())
                .count();

            info!(
                grades = ?distribution,
                without_violations,
                "Computed grade distribution per inspection"
            );
            print_report(&cleaned.report)?;
        }
        Commands::Grade { score } => {
            println!("{}", compute_grade(score));
        }
    }

    Ok(())
}

/// Resolves the pipeline config, loads the input and cleans it.
///
/// The config path comes from `--config`, falling back to `INSPECTION_CONFIG`.
#[tracing::instrument(skip(config))]
fn run(input: &str, config: Option<String>) -> Result<CleanedData> {
    let config_path = config.or_else(|| std::env::var("INSPECTION_CONFIG").ok());
    let config = match config_path {
        Some(path) => {
            info!(path = %path, "Loading pipeline config");
            PipelineConfig::load(&path)?
        }
        None => PipelineConfig::default(),
    };

    let rows = load_rows(input)?;
    Ok(clean_data(rows, &config)?)
}
