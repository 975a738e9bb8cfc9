//! Entry point for test harnesses.
//!
//! A [`Tracker`] owns one registry and one aggregator for a run. Clones share
//! them, so a tracker can be handed to every worker thread or async task.

use crate::aggregator::ReportAggregator;
use crate::finalizer::{self, FinalizeGuard};
use crate::interceptor::{Instrumenter, TestHooks};
use crate::model::TestResult;
use crate::registry::ExecutionRegistry;
use crate::report::TestReport;
use crate::writer::{ReportError, ReportWriter};
use std::path::PathBuf;
use std::sync::Arc;
use tally_proto::TestDescriptor;

#[derive(Debug, Clone)]
pub struct Tracker {
    registry: Arc<ExecutionRegistry>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self::with_aggregator(Arc::new(ReportAggregator::new()))
    }

    /// Creates a tracker reporting into an existing aggregator.
    pub fn with_aggregator(aggregator: Arc<ReportAggregator>) -> Self {
        Self {
            registry: Arc::new(ExecutionRegistry::new(aggregator)),
        }
    }

    pub fn registry(&self) -> &ExecutionRegistry {
        &self.registry
    }

    pub fn aggregator(&self) -> &Arc<ReportAggregator> {
        self.registry.aggregator()
    }

    /// Starts tracking `descriptor` under its `class#method` id and returns
    /// that id.
    pub fn start(&self, descriptor: &TestDescriptor) -> String {
        let id = descriptor.id();
        self.registry.start(id.clone(), descriptor);
        id
    }

    /// Starts tracking under a caller-chosen id, e.g. one per parameterized
    /// case.
    pub fn start_with_id(&self, id: impl Into<String>, descriptor: &TestDescriptor) {
        self.registry.start(id, descriptor);
    }

    pub fn finish(&self, id: &str, success: bool, error: Option<&str>) -> bool {
        self.registry.finish(id, success, error)
    }

    pub fn step_finish(&self, id: &str, order: i32, success: bool, error: Option<&str>) -> bool {
        self.registry.step_finish(id, order, success, error)
    }

    pub fn register_step(&self, id: &str, order: i32, description: &str) -> bool {
        self.registry.register_step(id, order, description)
    }

    /// Snapshot of everything aggregated so far. Running tests are not
    /// included.
    pub fn current_report(&self) -> TestReport {
        self.aggregator().snapshot()
    }

    /// Forgets running tests and empties the report, for a repeated run.
    pub fn reset_report(&self) {
        self.registry.clear();
        self.aggregator().reset();
    }

    /// Adds a result produced outside of tracking.
    pub fn add_manual_result(&self, result: TestResult) {
        self.aggregator().add(result);
    }

    /// Fails every running test and returns the final report.
    pub fn finalize(&self) -> TestReport {
        finalizer::finalize(&self.registry)
    }

    /// Finalizes and writes the report.
    pub fn close(&self, writer: &ReportWriter) -> Result<PathBuf, ReportError> {
        let report = self.finalize();
        writer.write(&report)
    }

    /// Returns a guard that finalizes and writes when it goes out of scope.
    pub fn finalize_on_drop(&self, writer: ReportWriter) -> FinalizeGuard {
        FinalizeGuard::new(self.clone(), writer)
    }

    /// An instrumenter reporting to this tracker.
    pub fn instrumenter(&self) -> Instrumenter {
        Instrumenter::new(Arc::new(self.clone()))
    }
}

impl TestHooks for Tracker {
    fn test_started(&self, descriptor: &TestDescriptor) {
        self.start(descriptor);
    }

    fn test_finished(&self, id: &str, success: bool, error: Option<&str>) {
        self.finish(id, success, error);
    }

    fn step_finished(&self, id: &str, order: i32, success: bool, error: Option<&str>) {
        self.step_finish(id, order, success, error);
    }

    fn step_registered(&self, id: &str, order: i32, description: &str) {
        self.register_step(id, order, description);
    }
}
