//! Store writer: drains one destination queue into one store client

use std::sync::Arc;
use std::time::Duration;

use memload_protocol::{EncodedItem, RunResult};
use tokio::sync::mpsc;

use crate::util::RateLimitedLogger;
use crate::{StoreClient, WriterMetrics};

/// Writer task for one destination
///
/// Owns the receiving end of the destination queue and the only client for
/// that store. Runs until every sender is dropped and the queue is empty.
pub struct StoreWriter {
    /// Device type served (for logging)
    name: String,

    receiver: mpsc::Receiver<EncodedItem>,
    client: Box<dyn StoreClient>,
    metrics: Arc<WriterMetrics>,
    error_logger: RateLimitedLogger,
}

impl StoreWriter {
    pub fn new(
        name: impl Into<String>,
        receiver: mpsc::Receiver<EncodedItem>,
        client: Box<dyn StoreClient>,
    ) -> Self {
        Self {
            name: name.into(),
            receiver,
            client,
            metrics: Arc::new(WriterMetrics::new()),
            error_logger: RateLimitedLogger::default(),
        }
    }

    /// Set the minimum interval between logged store failures
    #[must_use]
    pub fn with_log_interval(mut self, interval: Duration) -> Self {
        self.error_logger = RateLimitedLogger::new(interval);
        self
    }

    /// Shared handle to this writer's metrics
    ///
    /// Stays valid after `run()` consumes the writer.
    pub fn metrics_handle(&self) -> Arc<WriterMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store items until the queue is closed and drained
    ///
    /// Returns the number of items stored and failed.
    pub async fn run(mut self) -> RunResult {
        tracing::debug!(
            writer = %self.name,
            address = %self.client.address(),
            "store writer starting"
        );

        let mut result = RunResult::default();
        while let Some(item) = self.receiver.recv().await {
            self.metrics.item_received();

            match self.client.put(&item.key, &item.payload).await {
                Ok(()) => {
                    result.processed += 1;
                    self.metrics.item_stored(item.payload_len() as u64);
                }
                Err(e) => {
                    result.errors += 1;
                    self.metrics.item_failed();
                    self.error_logger.warn("store write failed", &item.key, &e);
                }
            }
        }

        let snapshot = self.metrics.snapshot();
        let stats = self.client.stats();
        tracing::info!(
            writer = %self.name,
            address = %self.client.address(),
            items_received = snapshot.items_received,
            items_stored = snapshot.items_stored,
            items_failed = snapshot.items_failed,
            bytes_written = snapshot.bytes_written,
            connects = stats.connects,
            retries = stats.retries,
            "store writer finished"
        );

        result
    }
}
