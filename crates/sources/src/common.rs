//! Feed metrics shared by the file feeder and the run report

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for file and line intake
#[derive(Debug, Default)]
pub struct SourceMetrics {
    /// Files returned by the file source
    pub files_listed: AtomicU64,

    /// Files fully read and handed to the pipeline
    pub files_completed: AtomicU64,

    /// Files skipped after an open or read failure
    pub files_failed: AtomicU64,

    /// Completed files successfully marked
    pub files_marked: AtomicU64,

    /// Non-blank lines pushed to the line queue
    pub lines_read: AtomicU64,

    /// Blank lines dropped before queueing
    pub lines_skipped: AtomicU64,

    /// Bytes of queued lines (after trimming)
    pub bytes_read: AtomicU64,
}

impl SourceMetrics {
    pub const fn new() -> Self {
        Self {
            files_listed: AtomicU64::new(0),
            files_completed: AtomicU64::new(0),
            files_failed: AtomicU64::new(0),
            files_marked: AtomicU64::new(0),
            lines_read: AtomicU64::new(0),
            lines_skipped: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn files_listed(&self, count: u64) {
        self.files_listed.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn file_completed(&self) {
        self.files_completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn file_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn file_marked(&self) {
        self.files_marked.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a queued line
    #[inline]
    pub fn line_read(&self, bytes: u64) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn line_skipped(&self) {
        self.lines_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> SourceMetricsSnapshot {
        SourceMetricsSnapshot {
            files_listed: self.files_listed.load(Ordering::Relaxed),
            files_completed: self.files_completed.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            files_marked: self.files_marked.load(Ordering::Relaxed),
            lines_read: self.lines_read.load(Ordering::Relaxed),
            lines_skipped: self.lines_skipped.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of feed metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceMetricsSnapshot {
    pub files_listed: u64,
    pub files_completed: u64,
    pub files_failed: u64,
    pub files_marked: u64,
    pub lines_read: u64,
    pub lines_skipped: u64,
    pub bytes_read: u64,
}
