//! Parser tier metrics
//!
//! Atomic counters shared by all parser workers. Relaxed ordering: values
//! are exact once the parser tier has been joined.

use std::sync::atomic::{AtomicU64, Ordering};

use memload_protocol::ParseErrorKind;

const PARSE_ERROR_KINDS: usize = ParseErrorKind::ALL.len();

/// Counters for the parser tier
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Lines taken from the line queue
    lines_received: AtomicU64,

    /// Items queued for a destination
    items_dispatched: AtomicU64,

    /// Rejected lines, indexed by `ParseErrorKind::index()`
    parse_errors: [AtomicU64; PARSE_ERROR_KINDS],

    /// Records whose key or payload could not be encoded
    encode_errors: AtomicU64,

    /// Records with a device type that has no destination
    unroutable: AtomicU64,

    /// Items whose destination queue was already closed
    dispatch_failures: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_line(&self) {
        self.lines_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dispatched(&self) {
        self.items_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_parse_error(&self, kind: ParseErrorKind) {
        self.parse_errors[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_encode_error(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_unroutable(&self) {
        self.unroutable.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dispatch_failure(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        PipelineMetricsSnapshot {
            lines_received: self.lines_received.load(Ordering::Relaxed),
            items_dispatched: self.items_dispatched.load(Ordering::Relaxed),
            parse_errors: std::array::from_fn(|i| self.parse_errors[i].load(Ordering::Relaxed)),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            unroutable: self.unroutable.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of parser tier metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineMetricsSnapshot {
    pub lines_received: u64,
    pub items_dispatched: u64,
    pub parse_errors: [u64; PARSE_ERROR_KINDS],
    pub encode_errors: u64,
    pub unroutable: u64,
    pub dispatch_failures: u64,
}

impl PipelineMetricsSnapshot {
    /// Rejected lines of one kind
    #[inline]
    pub fn parse_errors_of(&self, kind: ParseErrorKind) -> u64 {
        self.parse_errors[kind.index()]
    }

    /// Rejected lines of all kinds
    pub fn parse_errors_total(&self) -> u64 {
        self.parse_errors.iter().sum()
    }

    /// Every line the parser tier counted as an error
    pub fn errors_total(&self) -> u64 {
        self.parse_errors_total() + self.encode_errors + self.unroutable + self.dispatch_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let snapshot = PipelineMetrics::new().snapshot();
        assert_eq!(snapshot, PipelineMetricsSnapshot::default());
        assert_eq!(snapshot.errors_total(), 0);
    }

    #[test]
    fn test_parse_errors_by_kind() {
        let metrics = PipelineMetrics::new();
        metrics.record_parse_error(ParseErrorKind::MalformedLine);
        metrics.record_parse_error(ParseErrorKind::MalformedLine);
        metrics.record_parse_error(ParseErrorKind::InvalidAppId);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.parse_errors_of(ParseErrorKind::MalformedLine), 2);
        assert_eq!(snapshot.parse_errors_of(ParseErrorKind::InvalidAppId), 1);
        assert_eq!(snapshot.parse_errors_of(ParseErrorKind::MissingIdentity), 0);
        assert_eq!(snapshot.parse_errors_total(), 3);
    }

    #[test]
    fn test_errors_total() {
        let metrics = PipelineMetrics::new();
        metrics.record_line();
        metrics.record_line();
        metrics.record_line();
        metrics.record_line();
        metrics.record_parse_error(ParseErrorKind::InvalidCoordinate);
        metrics.record_encode_error();
        metrics.record_unroutable();
        metrics.record_dispatched();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.lines_received, 4);
        assert_eq!(snapshot.items_dispatched, 1);
        assert_eq!(snapshot.errors_total(), 3);
    }
}
