//! memload - Sinks
//!
//! Store clients and the writers that drain per-destination queues into them.
//!
//! # Architecture
//!
//! Each destination gets one [`StoreWriter`] task that owns exactly one
//! [`StoreClient`]. The writer pulls [`EncodedItem`]s from its bounded
//! queue, stores them one at a time and counts successes and failures.
//!
//! ```text
//! [Parser workers] --EncodedItem--> [Destination queue] --> [StoreWriter] --> [memcached]
//! ```
//!
//! # Available Clients
//!
//! | Client | Purpose |
//! |--------|---------|
//! | [`memcache::MemcacheClient`] | memcached text protocol over TCP |
//! | [`dry_run::DryRunClient`] | logs items instead of storing them |
//!
//! # Example
//!
//! ```ignore
//! use memload_sinks::{StoreWriter, dry_run::DryRunClient};
//! use tokio::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel(1);
//! let writer = StoreWriter::new("idfa", rx, Box::new(DryRunClient::new("127.0.0.1:33013")));
//! let handle = tokio::spawn(writer.run());
//! drop(tx);
//! let result = handle.await?;
//! ```

/// Dry-run client - logs instead of storing
pub mod dry_run;

/// memcached client
pub mod memcache;

/// Shared utilities
pub mod util;

mod common;
mod writer;

pub use common::{ClientStats, StoreClient, StoreError, WriterMetrics, WriterMetricsSnapshot};
pub use memload_protocol::EncodedItem;
pub use writer::StoreWriter;

#[cfg(test)]
mod writer_test;
