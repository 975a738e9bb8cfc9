//! The aggregated execution report.
//!
//! A `TestReport` is changed only by [`TestReport::add_result`], which folds
//! one finished result into the running totals and the three summaries. The
//! fold keeps `total == passed + failed == results.len()` and makes every
//! summary sum to `total`.

use crate::model::TestResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_proto::{Priority, Severity};

/// Label → number of tests.
pub type Summary = BTreeMap<String, usize>;

/// Execution snapshot: every accepted result plus running statistics.
///
/// Results appear in the order they were added, which for tracked tests is
/// completion order rather than start order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    execution_time: DateTime<Utc>,
    total_tests: usize,
    passed_tests: usize,
    failed_tests: usize,
    /// Sum of result durations, in milliseconds.
    total_duration: u64,
    test_results: Vec<TestResult>,
    severity_summary: Summary,
    priority_summary: Summary,
    category_summary: Summary,
}

impl Default for TestReport {
    fn default() -> Self {
        Self::new()
    }
}

impl TestReport {
    /// Creates an empty report.
    ///
    /// Severity and priority summaries list every level at zero so that
    /// distributions always show the full scale.
    pub fn new() -> Self {
        let severity_summary = Severity::ALL
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        let priority_summary = Priority::ALL
            .iter()
            .map(|p| (p.to_string(), 0))
            .collect();

        Self {
            execution_time: Utc::now(),
            total_tests: 0,
            passed_tests: 0,
            failed_tests: 0,
            total_duration: 0,
            test_results: Vec::new(),
            severity_summary,
            priority_summary,
            category_summary: Summary::new(),
        }
    }

    /// Folds a finished result into the report.
    ///
    /// A result that is not `Passed` counts as failed.
    pub fn add_result(&mut self, result: TestResult) {
        self.total_tests += 1;
        if result.is_passed() {
            self.passed_tests += 1;
        } else {
            self.failed_tests += 1;
        }
        self.total_duration += result.duration_ms();

        *self
            .severity_summary
            .entry(result.severity.to_string())
            .or_insert(0) += 1;
        *self
            .priority_summary
            .entry(result.priority.to_string())
            .or_insert(0) += 1;
        *self
            .category_summary
            .entry(result.category.clone())
            .or_insert(0) += 1;

        self.test_results.push(result);
    }

    pub fn execution_time(&self) -> DateTime<Utc> {
        self.execution_time
    }

    pub fn total_tests(&self) -> usize {
        self.total_tests
    }

    pub fn passed_tests(&self) -> usize {
        self.passed_tests
    }

    pub fn failed_tests(&self) -> usize {
        self.failed_tests
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration
    }

    pub fn test_results(&self) -> &[TestResult] {
        &self.test_results
    }

    pub fn severity_summary(&self) -> &Summary {
        &self.severity_summary
    }

    pub fn priority_summary(&self) -> &Summary {
        &self.priority_summary
    }

    pub fn category_summary(&self) -> &Summary {
        &self.category_summary
    }

    /// Percentage of passed tests, 0.0 for an empty report.
    pub fn success_rate(&self) -> f64 {
        if self.total_tests == 0 {
            return 0.0;
        }
        self.passed_tests as f64 / self.total_tests as f64 * 100.0
    }

    /// Returns true if every accepted result passed (vacuously true when empty).
    pub fn all_passed(&self) -> bool {
        self.failed_tests == 0
    }

    /// Returns only failed results.
    pub fn failures(&self) -> Vec<&TestResult> {
        self.test_results.iter().filter(|r| !r.is_passed()).collect()
    }
}
