//! Per-worker result tally

use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Processed/error counts reported by one worker when its input is exhausted
///
/// Parser workers report `processed: 0` (items are counted once, by the
/// writer that stores them). The run total is the sum of all reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Items successfully written to the store
    pub processed: u64,

    /// Items rejected at any stage
    pub errors: u64,
}

impl RunResult {
    /// Create a result with the given counts
    #[inline]
    pub const fn new(processed: u64, errors: u64) -> Self {
        Self { processed, errors }
    }

    /// Total number of items this result accounts for
    #[inline]
    pub const fn total(&self) -> u64 {
        self.processed + self.errors
    }
}

impl Add for RunResult {
    type Output = RunResult;

    fn add(self, rhs: RunResult) -> RunResult {
        RunResult {
            processed: self.processed + rhs.processed,
            errors: self.errors + rhs.errors,
        }
    }
}

impl AddAssign for RunResult {
    fn add_assign(&mut self, rhs: RunResult) {
        self.processed += rhs.processed;
        self.errors += rhs.errors;
    }
}

impl Sum for RunResult {
    fn sum<I: Iterator<Item = RunResult>>(iter: I) -> Self {
        iter.fold(RunResult::default(), Add::add)
    }
}
