//! memload - load device app lists from gzip TSV files into memcached
//!
//! # Usage
//!
//! ```bash
//! # Load with defaults (or configs/memload.toml when present)
//! memload
//! memload --config configs/memload.toml --pattern '/data/appsinstalled/*.tsv.gz'
//!
//! # Log payloads instead of storing them; files are not renamed
//! memload --dry --log-level debug
//!
//! # Check the payload encoding round trip
//! memload selftest
//! ```

mod cmd;

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use memload_config::{LogConfig, LogFormat, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Exit status of a run whose error rate was too high
const EXIT_REJECTED: u8 = 2;

/// Exit status of a run that could not complete
const EXIT_FATAL: u8 = 1;

/// memload - concurrent gzip TSV to memcached loader
#[derive(Parser, Debug)]
#[command(name = "memload")]
#[command(version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    // Run arguments when no subcommand is given
    #[command(flatten)]
    run: cmd::run::RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load input files into the stores (default)
    Run(cmd::run::RunArgs),

    /// Encode and decode sample lines to verify the payload format
    Selftest(cmd::selftest::SelftestArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Some(Command::Run(args)) => cmd::run::run(args).await,
        Some(Command::Selftest(args)) => cmd::selftest::run(args),
        // No subcommand = load (default behavior)
        None => cmd::run::run(cli.run).await,
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_REJECTED),
        Err(e) => {
            tracing::error!(error = format!("{e:#}"), "memload failed");
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Initialize the tracing subscriber from the `[log]` section
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.as_str()))
        .context("invalid log level")?;

    let writer = match &config.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {path}"))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    };

    let (console, json) = match config.format {
        LogFormat::Console => (
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_ansi(matches!(config.output, LogOutput::Stdout | LogOutput::Stderr))
                    .with_writer(writer),
            ),
            None,
        ),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(writer))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(json)
        .try_init()
        .context("logging already initialized")?;

    Ok(())
}
