//! Parser pool: turns raw lines into routed, encoded items
//!
//! N workers share one bounded MPMC line queue. Each line is parsed,
//! encoded and dispatched to its destination queue. A line that fails any
//! step is counted as an error by the worker that took it.

use std::sync::Arc;

use crossfire::MAsyncRx;
use memload_protocol::{EncodeError, ParseError, RunResult, encode, parse_line};
use memload_routing::{DestinationId, RoutingError};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::error::DispatchError;
use crate::metrics::PipelineMetrics;
use crate::result::WorkerReport;
use crate::router::Router;
use crate::tier::TierHandle;

/// Why a line produced no stored item
#[derive(Debug, Error)]
pub enum LineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Fixed-size pool of parser workers
#[derive(Debug, Clone, Copy)]
pub struct ParserPool {
    workers: usize,
}

impl ParserPool {
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Spawn the workers
    ///
    /// Each worker runs until the line queue is closed and empty, then sends
    /// one `WorkerReport::parser` on `results`.
    pub fn spawn(
        self,
        lines: MAsyncRx<String>,
        router: Arc<Router>,
        results: mpsc::Sender<WorkerReport>,
        metrics: Arc<PipelineMetrics>,
    ) -> TierHandle {
        let mut tier = TierHandle::new("parser");

        for index in 0..self.workers {
            let lines = lines.clone();
            let router = Arc::clone(&router);
            let results = results.clone();
            let metrics = Arc::clone(&metrics);

            tier.push(tokio::spawn(async move {
                let result = parser_worker(index, lines, &router, &metrics).await;
                if results
                    .send(WorkerReport::parser(index, result))
                    .await
                    .is_err()
                {
                    tracing::error!(worker = index, "result channel closed, parser result lost");
                }
            }));
        }

        tracing::info!(workers = self.workers, "parser pool started");
        tier
    }
}

async fn parser_worker(
    index: usize,
    lines: MAsyncRx<String>,
    router: &Router,
    metrics: &PipelineMetrics,
) -> RunResult {
    tracing::debug!(worker = index, "parser worker starting");

    let mut result = RunResult::default();
    while let Ok(line) = lines.recv().await {
        metrics.record_line();
        if let Err(e) = process_line(&line, router, metrics).await {
            result.errors += 1;
            tracing::debug!(worker = index, error = %e, line = %line, "rejected line");
        }
    }

    tracing::debug!(worker = index, errors = result.errors, "parser worker stopping");
    result
}

/// Parse, encode and dispatch one line
///
/// Waits while the destination queue is full. Every failure is recorded in
/// `metrics` before it is returned.
pub async fn process_line(
    line: &str,
    router: &Router,
    metrics: &PipelineMetrics,
) -> Result<DestinationId, LineError> {
    let record = parse_line(line).inspect_err(|e| metrics.record_parse_error(e.kind()))?;
    let item = encode(&record).inspect_err(|_| metrics.record_encode_error())?;

    match router.dispatch(&record.device_type, item).await {
        Ok(id) => {
            metrics.record_dispatched();
            Ok(id)
        }
        Err(e) => {
            match e {
                DispatchError::Unroutable(RoutingError::UnknownDeviceType { .. }) => {
                    metrics.record_unroutable()
                }
                _ => metrics.record_dispatch_failure(),
            }
            Err(e.into())
        }
    }
}
