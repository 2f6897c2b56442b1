//! Worker reports and their aggregation
//!
//! Every worker of both tiers sends exactly one [`WorkerReport`] when its
//! input is exhausted. The [`Aggregator`] merges them and refuses to produce
//! a total unless each expected worker reported exactly once.

use std::collections::HashSet;
use std::fmt;

use memload_protocol::RunResult;
use memload_routing::DestinationId;
use tokio::sync::mpsc;

use crate::error::{PipelineError, Result};

/// Identity of a pipeline worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerId {
    /// Parser worker by index
    Parser(usize),

    /// Store writer by destination
    Writer(DestinationId),
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parser(index) => write!(f, "parser-{index}"),
            Self::Writer(id) => write!(f, "writer-{}", id.index()),
        }
    }
}

/// Final tally of one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub result: RunResult,
}

impl WorkerReport {
    pub fn parser(index: usize, result: RunResult) -> Self {
        Self {
            worker: WorkerId::Parser(index),
            result,
        }
    }

    pub fn writer(id: DestinationId, result: RunResult) -> Self {
        Self {
            worker: WorkerId::Writer(id),
            result,
        }
    }
}

/// Merges worker reports into the run total
#[derive(Debug)]
pub struct Aggregator {
    expected: usize,
    seen: HashSet<WorkerId>,
    total: RunResult,
}

impl Aggregator {
    /// Create an aggregator expecting one report from each of
    /// `expected_workers` workers
    pub fn new(expected_workers: usize) -> Self {
        Self {
            expected: expected_workers,
            seen: HashSet::with_capacity(expected_workers),
            total: RunResult::default(),
        }
    }

    /// Merge one report
    ///
    /// # Errors
    ///
    /// Returns `DuplicateResult` if this worker already reported. The
    /// duplicate is not added to the total.
    pub fn absorb(&mut self, report: WorkerReport) -> Result<()> {
        if !self.seen.insert(report.worker) {
            return Err(PipelineError::DuplicateResult(report.worker));
        }
        tracing::trace!(
            worker = %report.worker,
            processed = report.result.processed,
            errors = report.result.errors,
            "worker result received"
        );
        self.total += report.result;
        Ok(())
    }

    /// Receive and merge reports until every sender is dropped
    ///
    /// # Errors
    ///
    /// Stops at the first duplicate report.
    pub async fn drain(&mut self, receiver: &mut mpsc::Receiver<WorkerReport>) -> Result<()> {
        while let Some(report) = receiver.recv().await {
            self.absorb(report)?;
        }
        Ok(())
    }

    /// Reports merged so far
    #[inline]
    pub fn received(&self) -> usize {
        self.seen.len()
    }

    #[inline]
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Produce the run total
    ///
    /// # Errors
    ///
    /// Returns `IncompleteTally` if fewer reports arrived than expected.
    pub fn finish(self) -> Result<RunResult> {
        if self.seen.len() < self.expected {
            return Err(PipelineError::IncompleteTally {
                expected: self.expected,
                received: self.seen.len(),
            });
        }
        Ok(self.total)
    }
}
