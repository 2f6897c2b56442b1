//! File feeder: pushes trimmed lines of every input file into the line queue
//!
//! Runs on a blocking thread because gzip decoding is synchronous. Sends
//! into the async line queue through the runtime handle so a full queue
//! parks the thread, and cancellation is observed between lines.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossfire::MAsyncTx;
use memload_sources::{
    CompletionMarker, LineSource, Lines, SourceError, SourceMetrics, trim_line,
};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// How feeding one file ended
#[derive(Debug)]
enum FileFeed {
    /// Every line was queued
    Completed,

    /// Decompression or read failure part way through
    Failed(SourceError),

    /// Cancellation observed before the file was exhausted
    Cancelled,

    /// No parser is left to receive lines
    Closed,
}

/// Feeds files one at a time, in order
pub struct Feeder {
    files: Vec<PathBuf>,
    lines: Arc<dyn LineSource>,
    marker: Arc<dyn CompletionMarker>,
    metrics: Arc<SourceMetrics>,
    cancel: CancellationToken,
}

impl Feeder {
    pub fn new(
        files: Vec<PathBuf>,
        lines: Arc<dyn LineSource>,
        marker: Arc<dyn CompletionMarker>,
        metrics: Arc<SourceMetrics>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            files,
            lines,
            marker,
            metrics,
            cancel,
        }
    }

    /// Feed every file, then hand the queue sender back
    ///
    /// Must run outside the async context (for example in `spawn_blocking`).
    /// Returns `true` when feeding stopped because of cancellation.
    pub fn run(self, handle: Handle, tx: MAsyncTx<String>) -> (bool, MAsyncTx<String>) {
        let mut cancelled = false;

        for path in &self.files {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            tracing::info!(path = %path.display(), "processing file");

            let lines = match self.lines.open(path) {
                Ok(lines) => lines,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    self.metrics.file_failed();
                    continue;
                }
            };

            match self.feed_file(&handle, &tx, lines) {
                FileFeed::Completed => {
                    self.metrics.file_completed();
                    self.mark(path);
                }
                FileFeed::Failed(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "file read failed, left unmarked");
                    self.metrics.file_failed();
                }
                FileFeed::Cancelled => {
                    tracing::info!(path = %path.display(), "feeding cancelled, file left unmarked");
                    cancelled = true;
                    break;
                }
                FileFeed::Closed => {
                    tracing::error!(path = %path.display(), "line queue closed, stopping feed");
                    break;
                }
            }
        }

        (cancelled, tx)
    }

    fn feed_file(&self, handle: &Handle, tx: &MAsyncTx<String>, lines: Lines) -> FileFeed {
        for line in lines {
            let line = match line {
                Ok(line) => line,
                Err(e) => return FileFeed::Failed(e),
            };

            let trimmed = trim_line(&line);
            if trimmed.is_empty() {
                self.metrics.line_skipped();
                continue;
            }

            let bytes = trimmed.len() as u64;
            let sent = handle.block_on(async {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => None,
                    sent = tx.send(trimmed.to_owned()) => Some(sent.is_ok()),
                }
            });

            match sent {
                Some(true) => self.metrics.line_read(bytes),
                Some(false) => return FileFeed::Closed,
                None => return FileFeed::Cancelled,
            }
        }

        FileFeed::Completed
    }

    fn mark(&self, path: &Path) {
        match self.marker.mark(path) {
            Ok(()) => self.metrics.file_marked(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot mark file as processed")
            }
        }
    }
}
