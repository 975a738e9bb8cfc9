//! # tally-core
//!
//! Test lifecycle tracking and report aggregation for Tally.
//!
//! This crate provides:
//! - Result records for tests and steps with exactly-once completion
//! - Metadata extraction onto fresh results
//! - A thread-safe execution registry for in-flight tests
//! - The report aggregator with per-severity, priority and category counts
//! - Transparent instrumentation of sync and async test bodies
//! - Finalization of unfinished tests, on close or on drop
//! - Report configuration, JSON persistence and sample data
//!
//! Most harnesses only need a [`Tracker`]:
//!
//! ```
//! use tally_core::{Tracker, instrument};
//! use tally_proto::{Severity, TestDescriptor, TestMetadata};
//!
//! let tracker = Tracker::new();
//! let desc = TestDescriptor::new("billing", "test_refund")
//!     .with_metadata(TestMetadata::new().with_severity(Severity::High));
//!
//! let outcome: Result<(), String> = instrument(&tracker, &desc, || Ok(()));
//! assert!(outcome.is_ok());
//!
//! let report = tracker.finalize();
//! assert_eq!(report.passed_tests(), 1);
//! ```

mod aggregator;
pub mod config;
mod extractor;
pub mod finalizer;
pub mod interceptor;
pub mod model;
mod registry;
pub mod report;
pub mod sample;
mod tracker;
pub mod writer;

pub use aggregator::ReportAggregator;
pub use config::{ConfigError, ReportConfig};
pub use extractor::apply_metadata;
pub use finalizer::{FinalizeGuard, INCOMPLETE_TEST_MESSAGE, finalize};
pub use interceptor::{
    BoxError, InstrumentError, InstrumentedTest, Instrumenter, TestFn, TestHooks, TestOutcome,
    instrument, instrument_async, panic_message,
};
pub use model::{DEFAULT_CATEGORY, Outcome, StepResult, TestResult, UNORDERED};
pub use registry::ExecutionRegistry;
pub use report::{Summary, TestReport};
pub use tracker::Tracker;
pub use writer::{ReportError, ReportWriter, read_report};
