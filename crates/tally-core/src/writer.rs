//! Report persistence.

use crate::config::ReportConfig;
use crate::report::TestReport;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to create the output directory or write the report file.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize or parse the report JSON.
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes finalized reports as JSON.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    file_name: String,
    pretty: bool,
}

impl ReportWriter {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            output_dir: config.output_directory.clone(),
            file_name: config.report_file_name.clone(),
            pretty: config.pretty_print,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }

    /// Serializes `report`, pretty or compact.
    pub fn render(&self, report: &TestReport) -> Result<String, ReportError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }

    /// Writes `report`, creating the output directory first.
    ///
    /// Returns the path written. A failure is not retried.
    pub fn write(&self, report: &TestReport) -> Result<PathBuf, ReportError> {
        let content = self.render(report)?;
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.report_path();
        std::fs::write(&path, content)?;

        info!(
            "Test report written to {} ({} tests)",
            path.display(),
            report.total_tests()
        );
        Ok(path)
    }
}

/// Reads a report written by [`ReportWriter::write`].
pub fn read_report(path: &Path) -> Result<TestReport, ReportError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
