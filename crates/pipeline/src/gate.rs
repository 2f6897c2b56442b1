//! Quality gate: accept or reject a run by its error rate

use std::fmt;

use memload_protocol::RunResult;

/// Highest error rate (exclusive) of an accepted run
pub const DEFAULT_MAX_ERROR_RATE: f64 = 0.01;

/// Outcome of evaluating a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub accepted: bool,

    /// `errors / processed`, NaN when nothing was processed
    pub error_rate: f64,

    pub threshold: f64,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.accepted {
            write!(f, "Acceptable error rate ({}). Successful load", self.error_rate)
        } else if self.error_rate.is_nan() {
            write!(f, "No records were loaded. Failed load")
        } else {
            write!(
                f,
                "High error rate ({} >= {}). Failed load",
                self.error_rate, self.threshold
            )
        }
    }
}

/// Compares a run's error rate with a fixed threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityGate {
    threshold: f64,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ERROR_RATE)
    }
}

impl QualityGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn evaluate(&self, result: RunResult) -> Verdict {
        evaluate(result, self.threshold)
    }
}

/// Evaluate a run total against `threshold`
///
/// Accepted iff `errors / processed < threshold`. A run that processed
/// nothing has a NaN rate and is rejected.
pub fn evaluate(result: RunResult, threshold: f64) -> Verdict {
    let error_rate = if result.processed == 0 {
        f64::NAN
    } else {
        result.errors as f64 / result.processed as f64
    };

    Verdict {
        // NaN compares false
        accepted: error_rate < threshold,
        error_rate,
        threshold,
    }
}
