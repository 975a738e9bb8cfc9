//! Thread-safe owner of the process-wide report.

use crate::model::TestResult;
use crate::report::TestReport;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Serializes every update to a single [`TestReport`].
///
/// The whole fold (counters, summaries, result list) runs under one lock, so a
/// snapshot never observes a half-applied result.
#[derive(Debug, Default)]
pub struct ReportAggregator {
    report: Mutex<TestReport>,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic inside a test body never holds this lock, but a poisoned lock
    // still carries a consistent report.
    fn lock(&self) -> MutexGuard<'_, TestReport> {
        self.report.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accepts one finished result.
    pub fn add(&self, result: TestResult) {
        debug!(
            "Aggregating {} (passed: {}, {}ms)",
            result.id(),
            result.is_passed(),
            result.duration_ms()
        );
        self.lock().add_result(result);
    }

    /// Returns a copy of the current report.
    pub fn snapshot(&self) -> TestReport {
        self.lock().clone()
    }

    /// Replaces the report with an empty one.
    pub fn reset(&self) {
        *self.lock() = TestReport::new();
    }

    pub fn total_tests(&self) -> usize {
        self.lock().total_tests()
    }

    pub fn success_rate(&self) -> f64 {
        self.lock().success_rate()
    }
}
