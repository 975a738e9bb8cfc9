//! Result records for tests and their steps.
//!
//! Both records start `Pending` and move to a terminal outcome exactly once.
//! Completing a test force-completes every step that is still pending with
//! the test's own outcome and error, so a terminal test never carries an
//! unterminated step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_proto::{Priority, Severity, TestLevel, TestMethodology, TestType};

/// Order assigned to tests that declare a test case without an order.
pub const UNORDERED: i32 = i32::MAX;

/// Category used when none is declared.
pub const DEFAULT_CATEGORY: &str = "general";

/// Execution state of a test or step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl Outcome {
    fn from_success(success: bool) -> Self {
        if success {
            Outcome::Passed
        } else {
            Outcome::Failed
        }
    }

    /// Returns true once the outcome can no longer change.
    pub fn is_terminal(self) -> bool {
        self != Outcome::Pending
    }
}

/// The outcome travels on the wire as a `passed` flag.
mod passed_flag {
    use super::Outcome;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(outcome: &Outcome, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (*outcome == Outcome::Passed).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Outcome, D::Error>
    where
        D: Deserializer<'de>,
    {
        bool::deserialize(deserializer).map(Outcome::from_success)
    }
}

fn end_not_before(start: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(start)
}

fn millis_between(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> u64 {
    end.map_or(0, |end| {
        u64::try_from((end - start).num_milliseconds()).unwrap_or(0)
    })
}

/// One declared or dynamically registered step of a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    order: i32,
    description: String,
    #[serde(rename = "passed", with = "passed_flag")]
    outcome: Outcome,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    error_message: Option<String>,
}

impl StepResult {
    /// Creates a pending step.
    pub fn new(order: i32, description: impl Into<String>) -> Self {
        Self {
            order,
            description: description.into(),
            outcome: Outcome::Pending,
            start_time: Utc::now(),
            end_time: None,
            error_message: None,
        }
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Duration in milliseconds, 0 while pending.
    pub fn duration_ms(&self) -> u64 {
        millis_between(self.start_time, self.end_time)
    }

    /// Moves the step to a terminal outcome.
    ///
    /// Returns false (and changes nothing) if the step was already terminal.
    /// The error is kept only for failures.
    pub fn complete(&mut self, success: bool, error: Option<&str>) -> bool {
        if self.outcome.is_terminal() {
            return false;
        }
        self.outcome = Outcome::from_success(success);
        self.end_time = Some(end_not_before(self.start_time));
        self.error_message = if success {
            None
        } else {
            error.map(str::to_string)
        };
        true
    }
}

/// Full record of one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    class_name: String,
    method_name: String,
    pub order: i32,
    pub test_name: String,
    pub category: String,
    #[serde(rename = "passed", with = "passed_flag")]
    outcome: Outcome,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    error_message: Option<String>,
    pub severity: Severity,
    pub priority: Priority,
    pub test_level: TestLevel,
    pub test_type: TestType,
    pub test_method: TestMethodology,
    pub author: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    steps: Vec<StepResult>,
}

impl TestResult {
    /// Creates a pending result with every classification at its default.
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        order: i32,
        test_name: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            order,
            test_name: test_name.into(),
            category: DEFAULT_CATEGORY.to_string(),
            outcome: Outcome::Pending,
            start_time: Utc::now(),
            end_time: None,
            error_message: None,
            severity: Severity::default(),
            priority: Priority::default(),
            test_level: TestLevel::default(),
            test_type: TestType::default(),
            test_method: TestMethodology::default(),
            author: None,
            version: None,
            description: None,
            steps: Vec::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Registry identifier of this test: `class#method`.
    pub fn id(&self) -> String {
        format!("{}#{}", self.class_name, self.method_name)
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Steps in insertion order.
    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    /// Duration in milliseconds, 0 while pending.
    pub fn duration_ms(&self) -> u64 {
        millis_between(self.start_time, self.end_time)
    }

    /// Appends a step. Orders are not checked for uniqueness.
    pub fn add_step(&mut self, step: StepResult) {
        self.steps.push(step);
    }

    /// Adds a pending step unless one with the same order already exists.
    ///
    /// Returns true if a step was added.
    pub fn register_step(&mut self, order: i32, description: impl Into<String>) -> bool {
        if self.steps.iter().any(|s| s.order == order) {
            return false;
        }
        self.steps.push(StepResult::new(order, description));
        true
    }

    /// Completes the first step with the given order.
    ///
    /// Returns false if no step matches or the match was already terminal.
    pub fn complete_step(&mut self, order: i32, success: bool, error: Option<&str>) -> bool {
        self.steps
            .iter_mut()
            .find(|s| s.order == order)
            .is_some_and(|step| step.complete(success, error))
    }

    /// Moves the test to a terminal outcome, propagating it to pending steps.
    ///
    /// Returns false (and changes nothing) if the test was already terminal.
    pub fn complete(&mut self, success: bool, error: Option<&str>) -> bool {
        if self.outcome.is_terminal() {
            return false;
        }
        self.outcome = Outcome::from_success(success);
        self.end_time = Some(end_not_before(self.start_time));
        self.error_message = if success {
            None
        } else {
            error.map(str::to_string)
        };

        for step in self.steps.iter_mut().filter(|s| !s.outcome.is_terminal()) {
            step.complete(success, error);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_steps() -> TestResult {
        let mut result = TestResult::new("suite", "test_checkout", 1, "test_checkout");
        result.add_step(StepResult::new(1, "add to cart"));
        result.add_step(StepResult::new(2, "pay"));
        result.add_step(StepResult::new(3, "confirm"));
        result
    }

    #[test]
    fn test_new_result_has_documented_defaults() {
        let result = TestResult::new("suite", "test_a", 7, "test_a");
        assert_eq!(result.order, 7);
        assert_eq!(result.category, "general");
        assert_eq!(result.severity, Severity::Medium);
        assert_eq!(result.priority, Priority::P2);
        assert_eq!(result.test_level, TestLevel::Unit);
        assert_eq!(result.test_type, TestType::Functional);
        assert_eq!(result.test_method, TestMethodology::BlackBox);
        assert_eq!(result.outcome(), Outcome::Pending);
        assert!(result.end_time().is_none());
        assert_eq!(result.duration_ms(), 0);
        assert_eq!(result.id(), "suite#test_a");
    }

    #[test]
    fn test_complete_transitions_exactly_once() {
        let mut result = TestResult::new("suite", "test_a", 1, "test_a");
        assert!(result.complete(false, Some("boom")));
        assert!(!result.complete(true, None));

        assert_eq!(result.outcome(), Outcome::Failed);
        assert_eq!(result.error_message(), Some("boom"));
        assert!(result.end_time().unwrap() >= result.start_time());
    }

    #[test]
    fn test_success_drops_error_message() {
        let mut result = TestResult::new("suite", "test_a", 1, "test_a");
        result.complete(true, Some("ignored"));
        assert!(result.error_message().is_none());
    }

    #[test]
    fn test_complete_force_completes_only_pending_steps() {
        let mut result = result_with_steps();
        assert!(result.complete_step(2, true, None));

        result.complete(false, Some("timeout"));

        let steps = result.steps();
        assert_eq!(steps[0].outcome(), Outcome::Failed);
        assert_eq!(steps[0].error_message(), Some("timeout"));
        assert_eq!(steps[1].outcome(), Outcome::Passed);
        assert!(steps[1].error_message().is_none());
        assert_eq!(steps[2].outcome(), Outcome::Failed);
        assert_eq!(steps[2].error_message(), Some("timeout"));
    }

    #[test]
    fn test_complete_step_targets_first_match_only() {
        let mut result = TestResult::new("suite", "test_a", 1, "test_a");
        result.add_step(StepResult::new(5, "first"));
        result.add_step(StepResult::new(5, "duplicate"));

        assert!(result.complete_step(5, false, Some("bad")));
        assert_eq!(result.steps()[0].outcome(), Outcome::Failed);
        assert_eq!(result.steps()[1].outcome(), Outcome::Pending);

        // The first match is terminal now, so the duplicate stays untouched.
        assert!(!result.complete_step(5, true, None));
        assert_eq!(result.steps()[1].outcome(), Outcome::Pending);
    }

    #[test]
    fn test_complete_step_unknown_order_is_noop() {
        let mut result = result_with_steps();
        assert!(!result.complete_step(42, true, None));
        assert!(result.steps().iter().all(|s| s.outcome() == Outcome::Pending));
    }

    #[test]
    fn test_register_step_is_idempotent() {
        let mut result = TestResult::new("suite", "test_a", 1, "test_a");
        assert!(result.register_step(1, "connect"));
        assert!(!result.register_step(1, "connect again"));
        assert_eq!(result.steps().len(), 1);
        assert_eq!(result.steps()[0].description(), "connect");
    }

    #[test]
    fn test_wire_format_uses_camel_case_and_passed_flag() {
        let mut result = result_with_steps();
        result.author = Some("Jane".to_string());
        result.complete(true, None);

        let value = serde_json::to_value(&result).unwrap();
        for key in [
            "className",
            "methodName",
            "order",
            "testName",
            "category",
            "passed",
            "startTime",
            "endTime",
            "errorMessage",
            "severity",
            "priority",
            "testLevel",
            "testType",
            "testMethod",
            "author",
            "version",
            "description",
            "steps",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["passed"], true);
        assert_eq!(value["severity"], "MEDIUM");
        assert_eq!(value["testMethod"], "BLACK_BOX");
        assert!(value["errorMessage"].is_null());
        assert_eq!(value["steps"][0]["passed"], true);
        assert_eq!(value["steps"][0]["order"], 1);
    }
}
