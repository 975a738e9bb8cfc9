//! Declaration manifests: test classes described in YAML.
//!
//! ```yaml
//! - name: com.example.LoginTest
//!   methods:
//!     - name: testLogin
//!       markers: [test]
//!       metadata:
//!         fields:
//!           name: User Login Test
//!           severity: CRITICAL
//!         steps:
//!           - order: 1
//!             description: Navigate to login page
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tally_core::{ReportAggregator, TestResult, UNORDERED, apply_metadata};
use tally_proto::{FrameworkMarker, RawMetadata, TestClass, TestDescriptor, TestMetadata};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ManifestMethod {
    name: String,
    #[serde(default)]
    markers: Vec<FrameworkMarker>,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Deserialize)]
struct ManifestClass {
    name: String,
    #[serde(default)]
    synthetic: bool,
    #[serde(default)]
    methods: Vec<ManifestMethod>,
}

impl From<ManifestClass> for TestClass {
    fn from(class: ManifestClass) -> Self {
        let methods = class
            .methods
            .into_iter()
            .map(|method| TestDescriptor {
                class_name: class.name.clone(),
                method_name: method.name,
                metadata: TestMetadata::from_raw(&method.metadata),
                markers: method.markers,
            })
            .collect();
        TestClass {
            name: class.name,
            synthetic: class.synthetic,
            methods,
        }
    }
}

/// Parses manifest YAML into test classes.
pub fn parse(content: &str) -> Result<Vec<TestClass>> {
    let classes: Vec<ManifestClass> =
        serde_yaml::from_str(content).context("Invalid test manifest")?;
    Ok(classes.into_iter().map(TestClass::from).collect())
}

pub fn load(path: &Path) -> Result<Vec<TestClass>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse manifest {}", path.display()))
}

/// Adds one passed result per method with declared metadata.
///
/// Nothing is executed: a declared method counts as passed and, unless it
/// declares an order, is ordered last. Returns the number of results added.
pub fn scan(classes: &[TestClass], aggregator: &ReportAggregator) -> usize {
    let mut added = 0;
    for class in classes {
        if !class.is_scannable() {
            debug!("Skipping helper type {}", class.name);
            continue;
        }
        for method in class.methods.iter().filter(|m| !m.metadata.is_empty()) {
            let mut result = TestResult::new(
                class.name.clone(),
                method.method_name.clone(),
                UNORDERED,
                method.method_name.clone(),
            );
            apply_metadata(&method.metadata, &mut result);
            result.complete(true, None);

            info!("Found declared test method: {}", method.id());
            aggregator.add(result);
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_proto::Severity;
    use tempfile::TempDir;

    const MANIFEST: &str = r"
- name: com.example.LoginTest
  methods:
    - name: testLogin
      markers: [test]
      metadata:
        fields:
          order: 1
          name: User Login Test
          category: authentication
          severity: critical
          priority: P0
        steps:
          - order: 1
            description: Navigate to login page
          - order: two
            description: Broken step
    - name: testPlain
      markers: [test]
    - name: testPayment
      metadata:
        fields:
          severity: HIGH
          testLevel: integration
- name: com.example.LoginTest$Fixture
  methods:
    - name: testHelper
      metadata:
        fields:
          severity: LOW
- name: generated
  synthetic: true
  methods:
    - name: testGenerated
      metadata:
        fields:
          severity: LOW
";

    #[test]
    fn test_parse_manifest() {
        let classes = parse(MANIFEST).unwrap();
        assert_eq!(classes.len(), 3);

        let login = &classes[0].methods[0];
        assert_eq!(login.id(), "com.example.LoginTest#testLogin");
        assert_eq!(login.markers, vec![FrameworkMarker::Test]);
        assert_eq!(login.metadata.severity, Some(Severity::Critical));
        // the step with a non-numeric order is skipped
        assert_eq!(login.metadata.steps.len(), 1);
        assert!(classes[2].synthetic);
    }

    #[test]
    fn test_scan_adds_declared_methods_only() {
        let classes = parse(MANIFEST).unwrap();
        let aggregator = ReportAggregator::new();

        assert_eq!(scan(&classes, &aggregator), 2);

        let report = aggregator.snapshot();
        assert_eq!(report.passed_tests(), 2);

        let login = &report.test_results()[0];
        assert_eq!(login.order, 1);
        assert_eq!(login.test_name, "User Login Test");
        assert_eq!(login.steps().len(), 1);
        assert!(login.steps()[0].is_passed());

        let payment = &report.test_results()[1];
        assert_eq!(payment.order, UNORDERED);
        assert_eq!(payment.severity, Severity::High);
        assert_eq!(payment.category, "general");
    }

    #[test]
    fn test_load_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load(&temp_dir.path().join("absent.yml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest"));
    }

    #[test]
    fn test_parse_rejects_non_list() {
        assert!(parse("name: not-a-list").is_err());
    }
}
