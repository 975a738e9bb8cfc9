//! Demonstration results covering every classification axis.

use crate::aggregator::ReportAggregator;
use crate::model::{StepResult, TestResult};
use tally_proto::{Priority, Severity, TestLevel, TestMethodology, TestType};
use tracing::info;

struct Sample {
    class_name: &'static str,
    method_name: &'static str,
    test_name: &'static str,
    category: &'static str,
    severity: Severity,
    priority: Priority,
    level: TestLevel,
    test_type: TestType,
    methodology: TestMethodology,
    failure: Option<&'static str>,
}

const SAMPLES: [Sample; 8] = [
    Sample {
        class_name: "com.example.UnitTest",
        method_name: "testUnitLogic",
        test_name: "Unit Logic Test",
        category: "unit",
        severity: Severity::Low,
        priority: Priority::P3,
        level: TestLevel::Unit,
        test_type: TestType::Functional,
        methodology: TestMethodology::WhiteBox,
        failure: None,
    },
    Sample {
        class_name: "com.example.IntegrationTest",
        method_name: "testIntegration",
        test_name: "Integration Test",
        category: "integration",
        severity: Severity::Medium,
        priority: Priority::P2,
        level: TestLevel::Integration,
        test_type: TestType::Functional,
        methodology: TestMethodology::BlackBox,
        failure: None,
    },
    Sample {
        class_name: "com.example.SystemTest",
        method_name: "testSystem",
        test_name: "System Test",
        category: "system",
        severity: Severity::High,
        priority: Priority::P1,
        level: TestLevel::System,
        test_type: TestType::Performance,
        methodology: TestMethodology::GrayBox,
        failure: Some("System timeout"),
    },
    Sample {
        class_name: "com.example.AcceptanceTest",
        method_name: "testAcceptance",
        test_name: "Acceptance Test",
        category: "acceptance",
        severity: Severity::Critical,
        priority: Priority::P0,
        level: TestLevel::Acceptance,
        test_type: TestType::Usability,
        methodology: TestMethodology::BlackBox,
        failure: None,
    },
    Sample {
        class_name: "com.example.PositiveTest",
        method_name: "testPositiveScenario",
        test_name: "Positive Test",
        category: "validation",
        severity: Severity::Medium,
        priority: Priority::P2,
        level: TestLevel::Unit,
        test_type: TestType::Functional,
        methodology: TestMethodology::Positive,
        failure: None,
    },
    Sample {
        class_name: "com.example.NegativeTest",
        method_name: "testNegativeScenario",
        test_name: "Negative Test",
        category: "validation",
        severity: Severity::Medium,
        priority: Priority::P2,
        level: TestLevel::Unit,
        test_type: TestType::Functional,
        methodology: TestMethodology::Negative,
        failure: None,
    },
    Sample {
        class_name: "com.example.BoundaryTest",
        method_name: "testBoundaryValues",
        test_name: "Boundary Value Test",
        category: "validation",
        severity: Severity::Medium,
        priority: Priority::P2,
        level: TestLevel::Unit,
        test_type: TestType::Functional,
        methodology: TestMethodology::BoundaryValue,
        failure: Some("Boundary condition failed"),
    },
    Sample {
        class_name: "com.example.CompatibilityTest",
        method_name: "testCompatibility",
        test_name: "Compatibility Test",
        category: "compatibility",
        severity: Severity::Medium,
        priority: Priority::P2,
        level: TestLevel::System,
        test_type: TestType::Compatibility,
        methodology: TestMethodology::BlackBox,
        failure: None,
    },
];

fn comprehensive() -> TestResult {
    let mut test = TestResult::new(
        "com.example.ComprehensiveTest",
        "testComprehensiveScenario",
        0,
        "Comprehensive Test Scenario",
    );
    test.category = "comprehensive".to_string();
    test.severity = Severity::Critical;
    test.priority = Priority::P0;
    test.test_level = TestLevel::System;
    test.test_type = TestType::Security;
    test.test_method = TestMethodology::StateTransition;
    test.author = Some("Test Engineer".to_string());
    test.version = Some("2.0".to_string());
    test.description = Some("A comprehensive test demonstrating all annotation types".to_string());

    for (order, description) in [
        (1, "Initialize test environment"),
        (2, "Execute security checks"),
        (3, "Validate state transitions"),
        (4, "Verify results"),
    ] {
        test.add_step(StepResult::new(order, description));
    }
    test.complete_step(1, true, None);
    test.complete_step(2, true, None);
    test.complete_step(3, false, Some("State transition validation failed"));
    test.complete_step(4, true, None);
    test.complete(true, None);
    test
}

/// The comprehensive scenario followed by one sample per level, type and
/// methodology. All results are terminal.
pub fn sample_results() -> Vec<TestResult> {
    let mut results = vec![comprehensive()];
    for (order, sample) in (1..).zip(SAMPLES.iter()) {
        let mut result = TestResult::new(
            sample.class_name,
            sample.method_name,
            order,
            sample.test_name,
        );
        result.category = sample.category.to_string();
        result.severity = sample.severity;
        result.priority = sample.priority;
        result.test_level = sample.level;
        result.test_type = sample.test_type;
        result.test_method = sample.methodology;
        result.complete(sample.failure.is_none(), sample.failure);
        results.push(result);
    }
    results
}

/// Adds the sample results to `aggregator`.
pub fn populate(aggregator: &ReportAggregator) {
    info!("Generating sample test data");
    for result in sample_results() {
        aggregator.add(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_set_shape() {
        let results = sample_results();
        assert_eq!(results.len(), 9);
        assert!(results.iter().all(|r| r.outcome().is_terminal()));

        let orders: Vec<i32> = results.iter().map(|r| r.order).collect();
        assert_eq!(orders, (0..=8).collect::<Vec<i32>>());
    }

    #[test]
    fn test_comprehensive_steps() {
        let test = &sample_results()[0];
        assert!(test.is_passed());
        assert_eq!(test.version.as_deref(), Some("2.0"));
        assert_eq!(test.steps().len(), 4);

        let failed: Vec<i32> = test
            .steps()
            .iter()
            .filter(|s| !s.is_passed())
            .map(|s| s.order())
            .collect();
        assert_eq!(failed, vec![3]);
        assert_eq!(
            test.steps()[2].error_message(),
            Some("State transition validation failed")
        );
    }

    #[test]
    fn test_populate_summaries() {
        let aggregator = ReportAggregator::new();
        populate(&aggregator);
        let report = aggregator.snapshot();

        assert_eq!(report.total_tests(), 9);
        assert_eq!(report.failed_tests(), 2);
        assert_eq!(report.severity_summary()["CRITICAL"], 2);
        assert_eq!(report.severity_summary()["TRIVIAL"], 0);
        assert_eq!(report.priority_summary()["P2"], 5);
        assert_eq!(report.category_summary()["validation"], 3);

        let messages: Vec<&str> = report
            .failures()
            .iter()
            .filter_map(|r| r.error_message())
            .collect();
        assert_eq!(messages, vec!["System timeout", "Boundary condition failed"]);
    }
}
