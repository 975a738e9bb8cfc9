//! Terminal rendering of a finalized report.

use colored::Colorize;
use std::fmt::Write;
use tally_core::{Summary, TestReport};

fn pass_fail(passed: bool) -> String {
    if passed {
        "PASS".green().to_string()
    } else {
        "FAIL".red().to_string()
    }
}

fn write_distribution(out: &mut String, title: &str, summary: &Summary) {
    let _ = writeln!(out, "\n{}", format!("--- {} Distribution ---", title).bold());
    for (label, count) in summary {
        let line = format!("  {}: {} tests", label, count);
        if *count == 0 {
            let _ = writeln!(out, "{}", line.dimmed());
        } else {
            let _ = writeln!(out, "{}", line);
        }
    }
}

/// Renders totals, distributions and per-test details.
pub fn render_summary(report: &TestReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "=== TEST REPORT SUMMARY ===".bold());
    let _ = writeln!(out, "Execution Time: {}", report.execution_time().to_rfc3339());
    let _ = writeln!(out, "Total Tests: {}", report.total_tests());
    let _ = writeln!(
        out,
        "Passed: {}",
        report.passed_tests().to_string().green()
    );
    let failed = report.failed_tests().to_string();
    let _ = writeln!(
        out,
        "Failed: {}",
        if report.failed_tests() == 0 {
            failed.normal()
        } else {
            failed.red()
        }
    );
    let _ = writeln!(out, "Success Rate: {:.2}%", report.success_rate());
    let _ = writeln!(out, "Total Duration: {}ms", report.total_duration_ms());

    write_distribution(&mut out, "Severity", report.severity_summary());
    write_distribution(&mut out, "Priority", report.priority_summary());
    write_distribution(&mut out, "Category", report.category_summary());

    let _ = writeln!(out, "\n{}", "--- Test Details ---".bold());
    for result in report.test_results() {
        let _ = writeln!(
            out,
            "  {} - {} - Severity: {} - Level: {} - Type: {} - Method: {}",
            result.test_name,
            pass_fail(result.is_passed()),
            result.severity,
            result.test_level,
            result.test_type,
            result.test_method
        );
        if let Some(error) = result.error_message() {
            let _ = writeln!(out, "    {}", error.dimmed());
        }
        if !result.steps().is_empty() {
            let _ = writeln!(out, "    Steps: {}", result.steps().len());
            for step in result.steps() {
                let _ = writeln!(
                    out,
                    "      Step {}: {} - {}",
                    step.order(),
                    step.description(),
                    pass_fail(step.is_passed())
                );
            }
        }
    }

    out
}

pub fn print_summary(report: &TestReport) {
    print!("{}", render_summary(report));
}
