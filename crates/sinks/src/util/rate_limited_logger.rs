//! Rate-limited store failure logging
//!
//! A dead memcached instance fails every item routed to it. Logging each
//! failure would flood the log, so failures are logged at most once per
//! interval together with the number suppressed since the last line.
//!
//! # Example
//!
//! ```ignore
//! use memload_sinks::util::RateLimitedLogger;
//! use std::time::Duration;
//!
//! let logger = RateLimitedLogger::new(Duration::from_secs(10));
//!
//! for key in keys {
//!     logger.warn("store write failed", key, &error);
//! }
//! ```

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval between logged failures
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Longest key prefix included in a log line
pub const MAX_KEY_LOG_LENGTH: usize = 64;

/// Logs at most one failure per interval, counting the rest
///
/// Thread-safe: atomic counters plus a mutex for the last log time.
pub struct RateLimitedLogger {
    min_interval: Duration,
    last_log_time: Mutex<Option<Instant>>,

    /// Failures since the last logged line
    pending: AtomicU64,

    /// Failures ever recorded
    total: AtomicU64,
}

impl RateLimitedLogger {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_log_time: Mutex::new(None),
            pending: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Record a failure for `key` and log it if the interval has elapsed
    ///
    /// Returns true if a line was written.
    pub fn warn(&self, message: &str, key: &str, error: &dyn Display) -> bool {
        self.pending.fetch_add(1, Ordering::Relaxed);
        let total = self.total.fetch_add(1, Ordering::Relaxed) + 1;

        if !self.interval_elapsed() {
            return false;
        }

        let count = self.pending.swap(0, Ordering::Relaxed);
        let key = truncate_key(key);
        if count > 1 {
            tracing::warn!(
                key = %key,
                error = %error,
                suppressed_count = count - 1,
                total_errors = total,
                "{message} (rate-limited)"
            );
        } else {
            tracing::warn!(key = %key, error = %error, total_errors = total, "{message}");
        }
        true
    }

    fn interval_elapsed(&self) -> bool {
        let mut last_time = self.last_log_time.lock();
        let now = Instant::now();

        match *last_time {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                *last_time = Some(now);
                true
            }
        }
    }

    /// Failures recorded since the last logged line
    pub fn pending_error_count(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn total_error_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl Default for RateLimitedLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL)
    }
}

fn truncate_key(key: &str) -> &str {
    if key.len() <= MAX_KEY_LOG_LENGTH {
        return key;
    }
    let mut end = MAX_KEY_LOG_LENGTH;
    while !key.is_char_boundary(end) {
        end -= 1;
    }
    &key[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_new_logger_has_no_errors() {
        let logger = RateLimitedLogger::new(Duration::from_secs(5));
        assert_eq!(logger.pending_error_count(), 0);
        assert_eq!(logger.total_error_count(), 0);
    }

    #[test]
    fn test_default_interval() {
        let logger = RateLimitedLogger::default();
        assert_eq!(logger.min_interval, DEFAULT_LOG_INTERVAL);
    }

    #[test]
    fn test_first_failure_always_logs() {
        let logger = RateLimitedLogger::new(Duration::from_secs(10));
        let error = io::Error::other("connection refused");

        assert!(logger.warn("store write failed", "idfa:abc", &error));
        assert_eq!(logger.total_error_count(), 1);
        assert_eq!(logger.pending_error_count(), 0);
    }

    #[test]
    fn test_rapid_failures_suppressed() {
        let logger = RateLimitedLogger::new(Duration::from_secs(10));
        let error = io::Error::other("connection refused");

        assert!(logger.warn("store write failed", "idfa:a", &error));
        for _ in 0..10 {
            assert!(!logger.warn("store write failed", "idfa:b", &error));
        }

        assert_eq!(logger.total_error_count(), 11);
        assert_eq!(logger.pending_error_count(), 10);
    }

    #[test]
    fn test_zero_interval_logs_every_failure() {
        let logger = RateLimitedLogger::new(Duration::ZERO);
        let error = io::Error::other("timeout");

        assert!(logger.warn("store write failed", "k1", &error));
        assert!(logger.warn("store write failed", "k2", &error));
    }

    #[test]
    fn test_truncate_key() {
        let long = "x".repeat(MAX_KEY_LOG_LENGTH + 10);
        assert_eq!(truncate_key(&long).len(), MAX_KEY_LOG_LENGTH);
        assert_eq!(truncate_key("idfa:abc"), "idfa:abc");

        let multibyte = "é".repeat(MAX_KEY_LOG_LENGTH);
        assert!(truncate_key(&multibyte).len() <= MAX_KEY_LOG_LENGTH);
    }
}
