//! memload - Pipeline
//!
//! Moves lines from gzip files into per-device-type memcached stores.
//!
//! # Architecture
//!
//! ```text
//! [Feeder]                 [Parsers × N]                [Writers × destinations]
//!  *.tsv.gz ──→ line queue ──→ parse → encode → Router ──→ queue ──→ StoreClient
//!               (MPMC, bounded)               O(1) lookup  (bounded)
//! ```
//!
//! # Key Design
//!
//! - **Bounded queues everywhere**: a slow store back-pressures its parsers,
//!   which back-pressure the feeder
//! - **One writer per destination**: each store client has a single owner
//! - **Ordered shutdown**: closing the line queue cascades through both tiers
//! - **Exact tally**: every worker reports once; the run is judged by the
//!   [`QualityGate`] on the aggregated total
//!
//! # Example
//!
//! ```ignore
//! use memload_pipeline::{PipelineConfig, PipelineDriver};
//! use memload_routing::RoutingTable;
//! use memload_sources::GlobFileSource;
//!
//! let table = RoutingTable::from_pairs([("idfa", "127.0.0.1:33013")])?;
//! let driver = PipelineDriver::new(
//!     PipelineConfig::default(),
//!     table,
//!     Box::new(GlobFileSource::new("/data/appsinstalled/*.tsv.gz")),
//!     Box::new(|d| Box::new(MemcacheClient::new(MemcacheConfig::new(&d.address)))),
//! );
//!
//! let report = driver.run().await?;
//! println!("{}", report.verdict);
//! ```

mod destination_handle;
mod driver;
mod error;
mod feed;
mod gate;
mod metrics;
mod parser_pool;
mod result;
mod router;
mod tier;

pub use destination_handle::DestinationHandle;
pub use driver::{
    ClientFactory, DEFAULT_QUEUE_SIZE, DriverState, FeedSummary, PipelineConfig, PipelineDriver,
    RunReport, WriterSummary, default_parser_workers,
};
pub use error::{DispatchError, PipelineError, Result};
pub use gate::{DEFAULT_MAX_ERROR_RATE, QualityGate, Verdict, evaluate};
pub use metrics::{PipelineMetrics, PipelineMetricsSnapshot};
pub use parser_pool::{LineError, ParserPool, process_line};
pub use result::{Aggregator, WorkerId, WorkerReport};
pub use router::Router;
pub use tier::TierHandle;

// Re-export key types from dependencies for convenience
pub use memload_protocol::{EncodedItem, RunResult};
pub use memload_routing::{Destination, DestinationId, RoutingTable};

#[cfg(test)]
mod router_test;
