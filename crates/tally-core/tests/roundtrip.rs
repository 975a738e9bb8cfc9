use tally_core::{ReportConfig, ReportWriter, Tracker, read_report, sample};
use tally_proto::{Severity, TestDescriptor, TestMetadata};
use tempfile::TempDir;

fn populated_tracker() -> Tracker {
    let tracker = Tracker::new();
    sample::populate(tracker.aggregator());

    let desc = TestDescriptor::new("com.example.LoginTest", "testLogin").with_metadata(
        TestMetadata::new()
            .with_order(1)
            .with_name("User Login Test")
            .with_category("authentication")
            .with_severity(Severity::Critical)
            .with_author("John Doe")
            .with_step(1, "Navigate to login page")
            .with_step(2, "Enter valid credentials"),
    );
    let id = tracker.start(&desc);
    tracker.step_finish(&id, 1, true, None);
    tracker.finish(&id, true, None);

    tracker.start(&TestDescriptor::new("com.example.LoginTest", "testLogout"));
    tracker
}

#[test]
fn test_written_report_reads_back_identically() {
    let temp_dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(&ReportConfig {
        output_directory: temp_dir.path().join("reports"),
        ..ReportConfig::default()
    });
    let tracker = populated_tracker();

    let path = tracker.close(&writer).unwrap();
    let written = tracker.current_report();
    let loaded = read_report(&path).unwrap();

    assert_eq!(loaded.total_tests(), 11);
    assert_eq!(loaded.total_tests(), written.total_tests());
    assert_eq!(loaded.passed_tests(), written.passed_tests());
    assert_eq!(loaded.failed_tests(), written.failed_tests());
    assert_eq!(loaded.total_duration_ms(), written.total_duration_ms());
    assert_eq!(loaded.severity_summary(), written.severity_summary());
    assert_eq!(loaded.priority_summary(), written.priority_summary());
    assert_eq!(loaded.category_summary(), written.category_summary());
    assert_eq!(loaded.test_results(), written.test_results());
    assert_eq!(loaded.execution_time(), written.execution_time());
}

#[test]
fn test_compact_report_has_expected_document_shape() {
    let temp_dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(&ReportConfig {
        output_directory: temp_dir.path().to_path_buf(),
        pretty_print: false,
        ..ReportConfig::default()
    });
    let tracker = populated_tracker();
    let path = tracker.close(&writer).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();

    let login = value["testResults"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["methodName"] == "testLogin")
        .unwrap();
    assert_eq!(login["testName"], "User Login Test");
    assert_eq!(login["category"], "authentication");
    assert_eq!(login["severity"], "CRITICAL");
    assert_eq!(login["version"], "1.0");
    assert_eq!(login["steps"][1]["passed"], true);

    let logout = value["testResults"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["methodName"] == "testLogout")
        .unwrap();
    assert_eq!(logout["passed"], false);
    assert_eq!(logout["errorMessage"], "did not complete properly");
}
