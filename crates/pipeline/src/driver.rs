//! Pipeline driver: owns one load run from file listing to verdict
//!
//! ```text
//! files ─→ [feeder] ─→ line queue ─→ [parser × N] ─→ router ─┬→ queue ─→ [writer idfa]
//!                       (MPMC)                                ├→ queue ─→ [writer gaid]
//!                                                             └→ ...
//!                         every worker ─→ result channel ─→ Aggregator ─→ QualityGate
//! ```
//!
//! Shutdown is strictly ordered: the feeder drops the line queue sender,
//! parsers drain and exit, the router (last holder of the destination
//! senders) is closed, writers drain and exit, and only then are the
//! results aggregated.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use memload_protocol::{ParseErrorKind, RunResult};
use memload_routing::{Destination, RoutingTable};
use memload_sinks::{StoreClient, StoreWriter, WriterMetrics, WriterMetricsSnapshot};
use memload_sources::{
    CompletionMarker, DotRenameMarker, FileSource, GzipLineSource, LineSource, SourceMetrics,
    SourceMetricsSnapshot,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::destination_handle::DestinationHandle;
use crate::error::{PipelineError, Result};
use crate::feed::Feeder;
use crate::gate::{DEFAULT_MAX_ERROR_RATE, QualityGate, Verdict};
use crate::metrics::{PipelineMetrics, PipelineMetricsSnapshot};
use crate::parser_pool::ParserPool;
use crate::result::{Aggregator, WorkerReport};
use crate::router::Router;
use crate::tier::TierHandle;

/// Default capacity of the line queue and of each destination queue
pub const DEFAULT_QUEUE_SIZE: usize = 1;

/// Builds the store client for one destination
pub type ClientFactory = Box<dyn Fn(&Destination) -> Box<dyn StoreClient> + Send + Sync>;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverState {
    Idle,
    Running,
    Draining,
    Aggregating,
    Done,
}

impl DriverState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
        }
    }

    /// States only move forward, one step at a time
    pub fn can_transition_to(&self, next: DriverState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Aggregating)
                | (Self::Aggregating, Self::Done)
        )
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizing and acceptance settings of a run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Capacity of the line queue and of each destination queue
    pub queue_size: usize,

    /// Number of parser workers
    pub parser_workers: usize,

    /// Quality gate threshold
    pub max_error_rate: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_size: DEFAULT_QUEUE_SIZE,
            parser_workers: default_parser_workers(),
            max_error_rate: DEFAULT_MAX_ERROR_RATE,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.queue_size == 0 {
            return Err(PipelineError::Config("queue_size must be at least 1".into()));
        }
        if self.parser_workers == 0 {
            return Err(PipelineError::Config(
                "parser_workers must be at least 1".into(),
            ));
        }
        if !self.max_error_rate.is_finite() || self.max_error_rate < 0.0 {
            return Err(PipelineError::Config(format!(
                "max_error_rate must be a non-negative number, got {}",
                self.max_error_rate
            )));
        }
        Ok(())
    }
}

/// One parser worker per available core
pub fn default_parser_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Feed counters of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub files: SourceMetricsSnapshot,

    /// Feeding stopped early on cancellation
    pub cancelled: bool,
}

/// Counters of one store writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterSummary {
    pub device_type: String,
    pub address: String,
    pub metrics: WriterMetricsSnapshot,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub result: RunResult,
    pub verdict: Verdict,
    pub feed: FeedSummary,
    pub metrics: PipelineMetricsSnapshot,
    pub writers: Vec<WriterSummary>,
    pub elapsed: Duration,
}

/// Runs the load pipeline once
pub struct PipelineDriver {
    config: PipelineConfig,
    routing_table: RoutingTable,
    files: Box<dyn FileSource>,
    lines: Arc<dyn LineSource>,
    marker: Arc<dyn CompletionMarker>,
    clients: ClientFactory,
    cancel: CancellationToken,
    state: DriverState,
}

impl PipelineDriver {
    /// Create a driver reading gzip files and renaming them when done
    pub fn new(
        config: PipelineConfig,
        routing_table: RoutingTable,
        files: Box<dyn FileSource>,
        clients: ClientFactory,
    ) -> Self {
        Self {
            config,
            routing_table,
            files,
            lines: Arc::new(GzipLineSource::new()),
            marker: Arc::new(DotRenameMarker),
            clients,
            cancel: CancellationToken::new(),
            state: DriverState::Idle,
        }
    }

    #[must_use]
    pub fn with_line_source(mut self, lines: Arc<dyn LineSource>) -> Self {
        self.lines = lines;
        self
    }

    #[must_use]
    pub fn with_marker(mut self, marker: Arc<dyn CompletionMarker>) -> Self {
        self.marker = marker;
        self
    }

    /// Stop feeding new lines once `cancel` fires
    ///
    /// Lines already queued are still processed and counted.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[inline]
    pub fn state(&self) -> DriverState {
        self.state
    }

    fn transition(&mut self, next: DriverState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(from = %self.state, to = %next, "driver state change");
        self.state = next;
        Ok(())
    }

    /// Execute the run
    ///
    /// # Errors
    ///
    /// Fails before any worker starts on invalid settings or when the input
    /// files cannot be listed, and after the writers finish when the worker
    /// tally is incomplete. Per-line failures never fail the run; they are
    /// counted and judged by the quality gate.
    pub async fn run(mut self) -> Result<RunReport> {
        let started = Instant::now();
        self.config.validate()?;

        let files = self.files.list()?;
        tracing::info!(count = files.len(), "input files listed");
        let source_metrics = Arc::new(SourceMetrics::new());
        source_metrics.files_listed(files.len() as u64);

        self.transition(DriverState::Running)?;

        let queue_size = self.config.queue_size;
        let destinations = self.routing_table.destinations().to_vec();
        let worker_count = self.config.parser_workers + destinations.len();

        let (line_tx, line_rx) = crossfire::mpmc::bounded_async::<String>(queue_size);
        let (result_tx, mut result_rx) = mpsc::channel::<WorkerReport>(worker_count);

        // Writers first so every destination queue has a consumer
        let mut handles = Vec::with_capacity(destinations.len());
        let mut writers = TierHandle::new("writer");
        let mut writer_metrics: Vec<(Destination, Arc<WriterMetrics>)> =
            Vec::with_capacity(destinations.len());

        for destination in &destinations {
            let (tx, rx) = mpsc::channel(queue_size);
            handles.push(DestinationHandle::new(
                destination.id,
                destination.device_type.clone(),
                tx,
            ));

            let writer = StoreWriter::new(
                destination.device_type.clone(),
                rx,
                (self.clients)(destination),
            );
            writer_metrics.push((destination.clone(), writer.metrics_handle()));

            let id = destination.id;
            let results = result_tx.clone();
            writers.push(tokio::spawn(async move {
                let result = writer.run().await;
                if results.send(WorkerReport::writer(id, result)).await.is_err() {
                    tracing::error!(destination = %id, "result channel closed, writer result lost");
                }
            }));
            tracing::info!(
                device_type = %destination.device_type,
                address = %destination.address,
                "store writer started"
            );
        }

        let router = Arc::new(Router::new(self.routing_table.clone(), handles)?);
        let metrics = Arc::new(PipelineMetrics::new());
        let parsers = ParserPool::new(self.config.parser_workers).spawn(
            line_rx,
            Arc::clone(&router),
            result_tx.clone(),
            Arc::clone(&metrics),
        );

        let feeder = Feeder::new(
            files,
            Arc::clone(&self.lines),
            Arc::clone(&self.marker),
            Arc::clone(&source_metrics),
            self.cancel.clone(),
        );
        let handle = tokio::runtime::Handle::current();
        let cancelled = match tokio::task::spawn_blocking(move || feeder.run(handle, line_tx)).await {
            Ok((cancelled, line_tx)) => {
                self.transition(DriverState::Draining)?;
                drop(line_tx);
                cancelled
            }
            Err(e) => {
                // The sender unwound with the feeder, so the queue is closed
                tracing::error!(error = %e, "file feeder failed");
                self.transition(DriverState::Draining)?;
                false
            }
        };

        parsers.join().await;
        match Arc::try_unwrap(router) {
            Ok(router) => router.close(),
            Err(router) => {
                tracing::error!(
                    refs = Arc::strong_count(&router),
                    "router still shared after parsers exited"
                );
                drop(router);
            }
        }
        writers.join().await;
        drop(result_tx);

        self.transition(DriverState::Aggregating)?;
        let mut aggregator = Aggregator::new(worker_count);
        aggregator.drain(&mut result_rx).await?;
        let result = aggregator.finish()?;

        self.transition(DriverState::Done)?;
        let verdict = QualityGate::new(self.config.max_error_rate).evaluate(result);

        let report = RunReport {
            result,
            verdict,
            feed: FeedSummary {
                files: source_metrics.snapshot(),
                cancelled,
            },
            metrics: metrics.snapshot(),
            writers: writer_metrics
                .into_iter()
                .map(|(destination, metrics)| WriterSummary {
                    device_type: destination.device_type,
                    address: destination.address,
                    metrics: metrics.snapshot(),
                })
                .collect(),
            elapsed: started.elapsed(),
        };
        log_report(&report);
        Ok(report)
    }
}

fn log_report(report: &RunReport) {
    let feed = &report.feed.files;
    tracing::info!(
        files = feed.files_listed,
        completed = feed.files_completed,
        failed = feed.files_failed,
        marked = feed.files_marked,
        lines = feed.lines_read,
        cancelled = report.feed.cancelled,
        "feed finished"
    );

    let metrics = &report.metrics;
    tracing::info!(
        dispatched = metrics.items_dispatched,
        malformed = metrics.parse_errors_of(ParseErrorKind::MalformedLine),
        missing_identity = metrics.parse_errors_of(ParseErrorKind::MissingIdentity),
        invalid_coordinate = metrics.parse_errors_of(ParseErrorKind::InvalidCoordinate),
        invalid_app_id = metrics.parse_errors_of(ParseErrorKind::InvalidAppId),
        encode_errors = metrics.encode_errors,
        unroutable = metrics.unroutable,
        "parsing finished"
    );

    for writer in &report.writers {
        tracing::info!(
            device_type = %writer.device_type,
            address = %writer.address,
            stored = writer.metrics.items_stored,
            failed = writer.metrics.items_failed,
            bytes = writer.metrics.bytes_written,
            "writer finished"
        );
    }

    tracing::info!(
        processed = report.result.processed,
        errors = report.result.errors,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "{}",
        report.verdict
    );
}
