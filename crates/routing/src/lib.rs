//! memload - Routing
//!
//! Pre-compiled routing table mapping a record's device-type tag to the
//! destination (memcached instance) that stores it.
//!
//! # Design
//!
//! The table is built once from configuration before any worker starts and
//! is read-only afterwards. Lookups are a single `HashMap` probe returning a
//! `Copy` [`DestinationId`]; no allocation happens in the hot path.
//!
//! # Example
//!
//! ```
//! use memload_routing::{RoutingError, RoutingTableBuilder};
//!
//! let mut builder = RoutingTableBuilder::new();
//! builder.add_destination("idfa", "127.0.0.1:33013").unwrap();
//! builder.add_destination("gaid", "127.0.0.1:33014").unwrap();
//! let table = builder.build().unwrap();
//!
//! let id = table.route("idfa").unwrap();
//! assert_eq!(table.address(id), Some("127.0.0.1:33013"));
//!
//! assert!(matches!(
//!     table.route("unknown_tag"),
//!     Err(RoutingError::UnknownDeviceType { .. })
//! ));
//! ```

mod destination_id;
mod error;
mod table;


pub use destination_id::DestinationId;
pub use error::{Result, RoutingError};
pub use table::{Destination, RoutingTable, RoutingTableBuilder};
