//! End-of-run sweep over tests that never finished.

use crate::registry::ExecutionRegistry;
use crate::report::TestReport;
use crate::tracker::Tracker;
use crate::writer::{ReportError, ReportWriter};
use std::path::PathBuf;
use tracing::{error, warn};

/// Failure message given to tests still running at finalization.
pub const INCOMPLETE_TEST_MESSAGE: &str = "did not complete properly";

/// Fails every test still in `registry` and returns the resulting report.
///
/// Safe to call repeatedly; later calls find nothing left to complete.
pub fn finalize(registry: &ExecutionRegistry) -> TestReport {
    let forced = registry.finish_all(false, Some(INCOMPLETE_TEST_MESSAGE));
    if forced > 0 {
        warn!("{} test(s) {}, marked as failed", forced, INCOMPLETE_TEST_MESSAGE);
    }
    registry.aggregator().snapshot()
}

/// Finalizes and writes the report when dropped, unless closed first.
///
/// `Drop` cannot return an error, so a failed write on drop is logged.
/// Call [`FinalizeGuard::close`] to get the result instead.
#[derive(Debug)]
pub struct FinalizeGuard {
    tracker: Tracker,
    writer: ReportWriter,
    done: bool,
}

impl FinalizeGuard {
    pub(crate) fn new(tracker: Tracker, writer: ReportWriter) -> Self {
        Self {
            tracker,
            writer,
            done: false,
        }
    }

    /// Finalizes and writes now.
    pub fn close(mut self) -> Result<PathBuf, ReportError> {
        self.done = true;
        self.tracker.close(&self.writer)
    }
}

impl Drop for FinalizeGuard {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        if let Err(e) = self.tracker.close(&self.writer) {
            error!("Failed to write test report on shutdown: {}", e);
        }
    }
}
