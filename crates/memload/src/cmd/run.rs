//! Run command - load input files into the stores
//!
//! Loads the configuration, applies command-line overrides, runs the
//! pipeline once and prints the verdict. Ctrl-C stops intake; lines already
//! queued are still stored and counted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use memload_config::{Config, DestinationsConfig, LogLevel, LogOutput, StoreConfig};
use memload_pipeline::{ClientFactory, PipelineConfig, PipelineDriver, RunReport};
use memload_routing::{Destination, RoutingTable, RoutingTableBuilder};
use memload_sinks::StoreClient;
use memload_sinks::dry_run::DryRunClient;
use memload_sinks::memcache::{MemcacheClient, MemcacheConfig};
use memload_sources::{CompletionMarker, DotRenameMarker, GlobFileSource, NoopMarker};

/// Config files tried, in order, when `--config` is not given
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["configs/memload.toml", "memload.toml"];

/// Run command arguments
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to configuration file (error if specified but not found)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Glob pattern of gzip input files
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Log payloads instead of storing them; input files are not renamed
    #[arg(long)]
    pub dry: bool,

    /// Number of parser workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Capacity of the line and destination queues
    #[arg(long)]
    pub queue_size: Option<usize>,

    /// Destination override as TAG=HOST:PORT (repeatable)
    #[arg(short, long = "destination", value_name = "TAG=ADDR")]
    pub destinations: Vec<String>,

    /// Highest accepted error rate (exclusive)
    #[arg(long)]
    pub max_error_rate: Option<f64>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Append logs to this file instead of stdout
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(pattern) = &self.pattern {
            config.source.pattern = pattern.clone();
        }
        if self.dry {
            config.store.dry_run = true;
        }
        if let Some(workers) = self.workers {
            config.global.parser_workers = Some(workers);
        }
        if let Some(queue_size) = self.queue_size {
            config.global.queue_size = queue_size;
        }
        if let Some(rate) = self.max_error_rate {
            config.quality.max_error_rate = rate;
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
        if let Some(path) = &self.log_file {
            config.log.output = LogOutput::File(path.display().to_string());
        }
        apply_destinations(&mut config.destinations, &self.destinations)?;

        config.validate().context("invalid configuration")?;
        Ok(())
    }
}

fn apply_destinations(destinations: &mut DestinationsConfig, overrides: &[String]) -> Result<()> {
    for entry in overrides {
        let Some((tag, address)) = entry.split_once('=') else {
            bail!("invalid destination '{entry}': expected TAG=HOST:PORT");
        };
        destinations.insert(tag.trim(), address.trim());
    }
    Ok(())
}

/// Run the load
///
/// Returns whether the quality gate accepted the run.
pub async fn run(args: RunArgs) -> Result<bool> {
    let (mut config, config_source) = load_config(args.config.as_deref())?;
    args.apply(&mut config)?;
    crate::init_logging(&config.log)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_source,
        pattern = %config.source.pattern,
        dry_run = config.store.dry_run,
        "memload starting"
    );

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(watch_interrupt(cancel.clone()));

    let report = run_load(&config, cancel).await;
    interrupt.abort();
    let report = report?;

    println!("{}", report.verdict);
    Ok(report.verdict.accepted)
}

/// Load the config file, or fall back to defaults
///
/// Returns the config and a description of where it came from.
fn load_config(path: Option<&Path>) -> Result<(Config, String)> {
    match path {
        Some(path) => {
            // User explicitly provided config path - must exist
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            let config = Config::from_file(path).context("failed to load configuration")?;
            Ok((config, path.display().to_string()))
        }
        None => {
            for candidate in DEFAULT_CONFIG_PATHS {
                let candidate = Path::new(candidate);
                if candidate.exists() {
                    let config =
                        Config::from_file(candidate).context("failed to load configuration")?;
                    return Ok((config, candidate.display().to_string()));
                }
            }
            Ok((Config::default(), "(defaults)".to_string()))
        }
    }
}

async fn run_load(config: &Config, cancel: CancellationToken) -> Result<RunReport> {
    let routing_table = routing_table(&config.destinations)?;
    for destination in routing_table.destinations() {
        info!(device_type = %destination.device_type, address = %destination.address, "destination");
    }

    let pipeline = PipelineConfig {
        queue_size: config.global.queue_size,
        parser_workers: config.global.effective_parser_workers(),
        max_error_rate: config.quality.max_error_rate,
    };

    let marker: Arc<dyn CompletionMarker> = if config.store.dry_run || !config.source.mark_processed {
        Arc::new(NoopMarker)
    } else {
        Arc::new(DotRenameMarker)
    };

    let driver = PipelineDriver::new(
        pipeline,
        routing_table,
        Box::new(GlobFileSource::new(config.source.pattern.clone())),
        client_factory(&config.store),
    )
    .with_marker(marker)
    .with_cancellation(cancel);

    driver.run().await.context("load failed")
}

fn routing_table(destinations: &DestinationsConfig) -> Result<RoutingTable> {
    let mut builder = RoutingTableBuilder::new();
    for (device_type, address) in destinations.iter() {
        builder
            .add_destination(device_type, address)
            .context("invalid destination")?;
    }
    Ok(builder.build()?)
}

fn client_factory(store: &StoreConfig) -> ClientFactory {
    let store = store.clone();
    Box::new(move |destination: &Destination| -> Box<dyn StoreClient> {
        if store.dry_run {
            return Box::new(DryRunClient::new(destination.address.clone()));
        }
        Box::new(MemcacheClient::new(
            MemcacheConfig::new(destination.address.clone())
                .with_connect_timeout(store.connect_timeout)
                .with_io_timeout(store.io_timeout)
                .with_retry_attempts(store.retry_attempts)
                .with_retry_interval(store.retry_interval),
        ))
    })
}

async fn watch_interrupt(cancel: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            warn!("interrupt received, finishing queued lines");
            cancel.cancel();
        }
        Err(e) => warn!(error = %e, "cannot listen for interrupt"),
    }
}
