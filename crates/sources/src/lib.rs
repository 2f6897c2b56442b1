//! memload - Sources
//!
//! Everything that touches input files: discovering them, reading their
//! lines, and marking them processed once their lines have been handed to
//! the pipeline.
//!
//! # Components
//!
//! - **[`FileSource`]** - enumerates input files ([`GlobFileSource`])
//! - **[`LineSource`]** - opens a file as a line iterator ([`GzipLineSource`])
//! - **[`CompletionMarker`]** - marks a drained file ([`DotRenameMarker`], [`NoopMarker`])
//!
//! All three are synchronous: the pipeline drives them from a blocking
//! thread so decompression never stalls the async workers.
//!
//! # Example
//!
//! ```no_run
//! use memload_sources::{FileSource, GlobFileSource, GzipLineSource, LineSource};
//!
//! let files = GlobFileSource::new("data/*.tsv.gz").list()?;
//! for path in files {
//!     for line in GzipLineSource::new().open(&path)? {
//!         println!("{}", line?);
//!     }
//! }
//! # Ok::<(), memload_sources::SourceError>(())
//! ```

mod common;
mod error;
mod file;
mod lines;
mod marker;

pub use common::{SourceMetrics, SourceMetricsSnapshot};
pub use error::{Result, SourceError};
pub use file::{FileSource, GlobFileSource};
pub use lines::{GzipLineSource, LineSource, Lines, trim_line};
pub use marker::{CompletionMarker, DotRenameMarker, NoopMarker, dot_path};
