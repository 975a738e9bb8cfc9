//! Copies declared metadata onto a freshly created result.
//!
//! Each field is applied on its own; a field that was not declared keeps the
//! value the result was constructed with.

use crate::model::{StepResult, TestResult, UNORDERED};
use tally_proto::{DEFAULT_INFO_VERSION, TestMetadata};
use tracing::debug;

/// Populates `result` from `metadata`.
///
/// A declared test-case block without an order moves the test to the
/// "run last" position. Empty names and categories count as undeclared.
/// Declared steps are appended in declaration order with their orders kept
/// verbatim.
pub fn apply_metadata(metadata: &TestMetadata, result: &mut TestResult) {
    if let Some(case) = &metadata.test_case {
        result.order = case.order.unwrap_or(UNORDERED);

        match non_blank(case.name.as_deref()) {
            Some(name) => result.test_name = name.to_string(),
            None => result.test_name = result.method_name().to_string(),
        }

        if let Some(category) = non_blank(case.category.as_deref()) {
            result.category = category.to_string();
        } else if case.category.is_some() {
            debug!(
                "Ignoring blank category declared on {}, keeping '{}'",
                result.id(),
                result.category
            );
        }
    }

    if let Some(severity) = metadata.severity {
        result.severity = severity;
    }
    if let Some(priority) = metadata.priority {
        result.priority = priority;
    }
    if let Some(level) = metadata.test_level {
        result.test_level = level;
    }
    if let Some(test_type) = metadata.test_type {
        result.test_type = test_type;
    }
    if let Some(methodology) = metadata.test_method {
        result.test_method = methodology;
    }

    if let Some(info) = &metadata.info {
        result.author.clone_from(&info.author);
        result.version = Some(
            info.version
                .clone()
                .unwrap_or_else(|| DEFAULT_INFO_VERSION.to_string()),
        );
        result.description.clone_from(&info.description);
    }

    for step in &metadata.steps {
        result.add_step(StepResult::new(step.order, step.description.clone()));
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Outcome;
    use tally_proto::{
        Priority, RawMetadata, Severity, TestLevel, TestMethodology, TestType,
    };

    fn fresh() -> TestResult {
        TestResult::new("com.example.LoginTest", "testLogin", 3, "testLogin")
    }

    #[test]
    fn test_empty_metadata_keeps_constructor_defaults() {
        let mut result = fresh();
        apply_metadata(&TestMetadata::new(), &mut result);

        assert_eq!(result.order, 3);
        assert_eq!(result.test_name, "testLogin");
        assert_eq!(result.category, "general");
        assert_eq!(result.severity, Severity::Medium);
        assert_eq!(result.priority, Priority::P2);
        assert_eq!(result.test_level, TestLevel::Unit);
        assert_eq!(result.test_type, TestType::Functional);
        assert_eq!(result.test_method, TestMethodology::BlackBox);
        assert!(result.author.is_none());
        assert!(result.version.is_none());
        assert!(result.steps().is_empty());
    }

    #[test]
    fn test_info_version_is_kept_when_declared() {
        let mut result = fresh();
        apply_metadata(&TestMetadata::new().with_version("2.0"), &mut result);
        assert_eq!(result.version.as_deref(), Some("2.0"));
        assert!(result.author.is_none());
    }

    #[test]
    fn test_full_declaration_is_applied() {
        let meta = TestMetadata::new()
            .with_order(1)
            .with_name("User Login Test")
            .with_category("authentication")
            .with_severity(Severity::Critical)
            .with_priority(Priority::P0)
            .with_level(TestLevel::System)
            .with_type(TestType::Functional)
            .with_methodology(TestMethodology::BlackBox)
            .with_author("John Doe")
            .with_description("Tests user login functionality")
            .with_step(1, "Navigate to login page")
            .with_step(2, "Enter valid credentials");

        let mut result = fresh();
        apply_metadata(&meta, &mut result);

        assert_eq!(result.order, 1);
        assert_eq!(result.test_name, "User Login Test");
        assert_eq!(result.category, "authentication");
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.priority, Priority::P0);
        assert_eq!(result.test_level, TestLevel::System);
        assert_eq!(result.author.as_deref(), Some("John Doe"));
        assert_eq!(result.version.as_deref(), Some("1.0"));
        assert_eq!(
            result.description.as_deref(),
            Some("Tests user login functionality")
        );
        assert_eq!(result.steps().len(), 2);
        assert_eq!(result.steps()[1].description(), "Enter valid credentials");
        assert!(result.steps().iter().all(|s| s.outcome() == Outcome::Pending));
    }

    #[test]
    fn test_case_without_order_runs_last() {
        let mut result = fresh();
        apply_metadata(&TestMetadata::new().with_category("payment"), &mut result);
        assert_eq!(result.order, UNORDERED);
        assert_eq!(result.test_name, "testLogin");
    }

    #[test]
    fn test_no_case_block_keeps_registry_order() {
        let mut result = fresh();
        apply_metadata(&TestMetadata::new().with_severity(Severity::Low), &mut result);
        assert_eq!(result.order, 3);
    }

    #[test]
    fn test_blank_name_and_category_fall_back() {
        let mut result = fresh();
        apply_metadata(
            &TestMetadata::new().with_name("  ").with_category(""),
            &mut result,
        );
        assert_eq!(result.test_name, "testLogin");
        assert_eq!(result.category, "general");
    }

    #[test]
    fn test_step_orders_are_not_renumbered() {
        let meta = TestMetadata::new()
            .with_step(10, "a")
            .with_step(2, "b")
            .with_step(10, "c");
        let mut result = fresh();
        apply_metadata(&meta, &mut result);

        let orders: Vec<i32> = result.steps().iter().map(|s| s.order()).collect();
        assert_eq!(orders, vec![10, 2, 10]);
    }

    #[test]
    fn test_malformed_raw_fragment_keeps_default() {
        let raw = RawMetadata::new()
            .with_field("severity", "catastrophic")
            .with_field("priority", "P1");
        let mut result = fresh();
        apply_metadata(&TestMetadata::from_raw(&raw), &mut result);

        assert_eq!(result.severity, Severity::Medium);
        assert_eq!(result.priority, Priority::P1);
    }
}
