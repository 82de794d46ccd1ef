//! trove: batch wallet reputation scoring from deposit history.
//!
//! Each subcommand runs one pipeline stage against a data directory laid out
//! as `raw/` (input transaction files) and `processed/` (derived tables).

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use trove_pipeline::{Pipeline, PipelineConfig, inspect_file};

#[derive(Parser, Debug)]
#[command(name = "trove", version, about = "Deposit-history reputation scoring for wallet addresses")]
struct Cli {
    /// Configuration file (TOML, JSON or YAML); `TROVE__*` env vars override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding `raw/` and `processed/`
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe the structure of a raw JSON file
    Inspect {
        file: PathBuf,
    },
    /// Ingest raw files into the processed deposit table
    Process,
    /// Compute wallet features and scores
    Features,
    /// Run the risk-adjusted scorer over the risk feature table
    Score,
    /// Generate the wallet analysis report
    Analyze,
    /// Process, features and analyze; score when its input exists
    Run,
}

impl Cli {
    /// Merge CLI overrides into the loaded configuration.
    fn into_config(self) -> Result<(PipelineConfig, Command)> {
        let mut config = PipelineConfig::load(self.config.as_deref()).context("loading configuration")?;
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        Ok((config, self.command))
    }
}

fn main() {
    let cli = Cli::parse();
    let (config, command) = match cli.into_config() {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(2);
        }
    };

    init_logging(&config.log_level, &config.log_format);
    info!("Trove v{}", env!("CARGO_PKG_VERSION"));
    info!("data_dir: {:?}", config.data_dir);

    if let Err(e) = run(config, command) {
        error!("{e:#}");
        process::exit(1);
    }
}

fn run(config: PipelineConfig, command: Command) -> Result<()> {
    let pipeline = Pipeline::new(config);
    match command {
        Command::Inspect { file } => {
            let shape = inspect_file(&file).with_context(|| format!("inspecting {}", file.display()))?;
            print!("{shape}");
        }
        Command::Process => {
            let (deposits, summary) = pipeline.process()?;
            info!(
                deposits = deposits.len(),
                files = summary.files_read,
                skipped_files = summary.files_skipped,
                malformed = summary.entries_malformed,
                "process: done"
            );
        }
        Command::Features => {
            let run = pipeline.features()?;
            info!(wallets = run.features.len(), top = run.top.len(), "features: done");
        }
        Command::Score => {
            let scores = pipeline.score()?;
            info!(wallets = scores.len(), "score: done");
        }
        Command::Analyze => {
            let report = pipeline.analyze(Utc::now())?;
            info!(
                wallets = report.total_wallets_analyzed,
                mean_score = report.score_distribution.mean,
                path = %pipeline.store().analysis_path().display(),
                "analyze: done"
            );
        }
        Command::Run => {
            pipeline.run_all(Utc::now())?;
        }
    }
    Ok(())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Pass `format = "json"` for structured JSON output. Any other value
/// defaults to human-readable text. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}
