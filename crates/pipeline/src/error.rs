//! Pipeline error types
//!
//! Run-level failures only. Record, routing and store failures are counted
//! and reported through the quality gate instead.

use thiserror::Error;

use memload_routing::{DestinationId, RoutingError};
use memload_sources::SourceError;

use crate::driver::DriverState;
use crate::result::WorkerId;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Routing table names a destination with no queue handle
    #[error("destination not registered: {0}")]
    DestinationNotRegistered(DestinationId),

    /// Queue handle given for a destination the table does not know
    #[error("unknown destination handle: {0}")]
    UnknownDestination(DestinationId),

    /// Two reports from the same worker
    #[error("duplicate result from worker {0}")]
    DuplicateResult(WorkerId),

    /// Fewer reports than workers
    #[error("incomplete tally: expected {expected} worker results, received {received}")]
    IncompleteTally { expected: usize, received: usize },

    /// Driver asked to move between states out of order
    #[error("invalid driver transition {from} -> {to}")]
    InvalidTransition { from: DriverState, to: DriverState },

    /// Input files could not be enumerated
    #[error("cannot list input files: {0}")]
    Source(#[from] SourceError),

    /// Routing table could not be built
    #[error("routing configuration error: {0}")]
    Routing(#[from] RoutingError),

    /// Invalid pipeline settings
    #[error("invalid pipeline configuration: {0}")]
    Config(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Why an encoded item could not be queued for its destination
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No destination for the record's device type
    #[error(transparent)]
    Unroutable(#[from] RoutingError),

    /// Destination queue closed before the item could be queued
    #[error("destination queue closed: {0}")]
    Closed(DestinationId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::DestinationNotRegistered(DestinationId::new(5));
        assert!(err.to_string().contains("destination:5"));

        let err = PipelineError::DuplicateResult(WorkerId::Parser(3));
        assert!(err.to_string().contains("parser-3"));

        let err = PipelineError::IncompleteTally {
            expected: 8,
            received: 7,
        };
        assert_eq!(
            err.to_string(),
            "incomplete tally: expected 8 worker results, received 7"
        );

        let err = PipelineError::InvalidTransition {
            from: DriverState::Idle,
            to: DriverState::Done,
        };
        assert!(err.to_string().contains("idle -> done"));
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::from(RoutingError::unknown_device_type("imei"));
        assert_eq!(err.to_string(), "unknown device type 'imei'");

        let err = DispatchError::Closed(DestinationId::new(1));
        assert!(err.to_string().contains("destination:1"));
    }
}
