//! memload Protocol - Core types for the ingestion pipeline
//!
//! This crate provides the foundational types that flow through the pipeline:
//! - `Record` - A validated app-install event parsed from one input line
//! - `EncodedItem` - Store key plus protobuf payload, ready for a writer
//! - `UserApps` - The protobuf message stored as the value blob
//! - `RunResult` - Per-worker processed/error tally
//!
//! # Input Line Format
//!
//! ```text
//! <device_type>\t<device_id>\t<lat>\t<lon>\t<app_id>,<app_id>,...
//! ```
//!
//! # Example
//!
//! ```
//! use memload_protocol::{encode, parse_line};
//!
//! let record = parse_line("idfa\te7e1a50c\t55.55\t42.42\t1423,43,567").unwrap();
//! let item = encode(&record).unwrap();
//! assert_eq!(item.key, "idfa:e7e1a50c");
//! ```

mod encode;
mod error;
mod record;
mod result;

pub use encode::{EncodedItem, MAX_KEY_LENGTH, UserApps, decode_payload, encode};
pub use error::{DecodeError, EncodeError, ParseError, ParseErrorKind};
pub use record::{FIELD_COUNT, Record, parse_line};
pub use result::RunResult;

// Re-export bytes for convenience
pub use bytes::Bytes;

#[cfg(test)]
mod record_test;
