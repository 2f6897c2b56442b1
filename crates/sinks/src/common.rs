//! Common types for store clients and writers

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// A connection to one key-value store instance
///
/// Each client is owned by exactly one writer task, so `put` takes
/// `&mut self` and implementations need no internal locking.
#[async_trait]
pub trait StoreClient: Send {
    /// Store `payload` under `key`, overwriting any previous value
    async fn put(&mut self, key: &str, payload: &Bytes) -> Result<(), StoreError>;

    /// Address of the store instance (for logging)
    fn address(&self) -> &str;

    /// Connection statistics gathered so far
    fn stats(&self) -> ClientStats {
        ClientStats::default()
    }
}

/// Connection-level counters reported by a client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Connections established
    pub connects: u64,

    /// Attempts repeated after a failure
    pub retries: u64,
}

/// Store write failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection could not be established
    #[error("connection to {address} failed: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Connection broke while writing or reading the reply
    #[error("I/O error talking to {address}: {source}")]
    Io {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Operation did not finish in time
    #[error("{operation} to {address} timed out")]
    Timeout {
        address: String,
        operation: &'static str,
    },

    /// Store answered with something other than success
    #[error("{address} rejected '{key}': {reply}")]
    Rejected {
        address: String,
        key: String,
        reply: String,
    },

    /// Every attempt failed
    #[error("all {attempts} attempts to store '{key}' failed: {last_error}")]
    RetriesExhausted {
        key: String,
        attempts: u32,
        last_error: String,
    },
}

impl StoreError {
    pub fn connect(address: impl Into<String>, source: io::Error) -> Self {
        Self::Connect {
            address: address.into(),
            source,
        }
    }

    pub fn io(address: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            address: address.into(),
            source,
        }
    }

    pub fn timeout(address: impl Into<String>, operation: &'static str) -> Self {
        Self::Timeout {
            address: address.into(),
            operation,
        }
    }

    pub fn rejected(
        address: impl Into<String>,
        key: impl Into<String>,
        reply: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            address: address.into(),
            key: key.into(),
            reply: reply.into(),
        }
    }

    /// Whether a fresh connection might succeed where this attempt failed
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Io { .. } | Self::Timeout { .. }
        )
    }
}

/// Metrics for one store writer
#[derive(Debug, Default)]
pub struct WriterMetrics {
    /// Items pulled from the destination queue
    pub items_received: AtomicU64,

    /// Items stored successfully
    pub items_stored: AtomicU64,

    /// Items the store did not accept
    pub items_failed: AtomicU64,

    /// Payload bytes stored
    pub bytes_written: AtomicU64,
}

impl WriterMetrics {
    pub const fn new() -> Self {
        Self {
            items_received: AtomicU64::new(0),
            items_stored: AtomicU64::new(0),
            items_failed: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn item_received(&self) {
        self.items_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn item_stored(&self, bytes: u64) {
        self.items_stored.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn item_failed(&self) {
        self.items_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> WriterMetricsSnapshot {
        WriterMetricsSnapshot {
            items_received: self.items_received.load(Ordering::Relaxed),
            items_stored: self.items_stored.load(Ordering::Relaxed),
            items_failed: self.items_failed.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of writer metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterMetricsSnapshot {
    pub items_received: u64,
    pub items_stored: u64,
    pub items_failed: u64,
    pub bytes_written: u64,
}
