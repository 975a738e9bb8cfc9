//! Report output configuration.
//!
//! Values are resolved from built-in defaults, then an optional YAML file,
//! then `TALLY_*` environment variables. Command-line flags are applied on
//! top by the caller.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const ENV_OUTPUT_DIR: &str = "TALLY_OUTPUT_DIR";
pub const ENV_REPORT_FILE: &str = "TALLY_REPORT_FILE";
pub const ENV_PRETTY_PRINT: &str = "TALLY_PRETTY_PRINT";
pub const ENV_SAMPLE_DATA: &str = "TALLY_SAMPLE_DATA";
pub const ENV_SCAN: &str = "TALLY_SCAN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("target/test-reports")
}

fn default_report_file_name() -> String {
    "custom-test-report.json".to_string()
}

fn default_true() -> bool {
    true
}

/// Where and how the report is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    #[serde(default = "default_report_file_name")]
    pub report_file_name: String,

    #[serde(default = "default_true")]
    pub pretty_print: bool,

    /// Include the built-in sample results.
    #[serde(default)]
    pub generate_sample_data: bool,

    /// Scan the declaration manifest for test classes.
    #[serde(default = "default_true")]
    pub scan_test_classes: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            report_file_name: default_report_file_name(),
            pretty_print: true,
            generate_sample_data: false,
            scan_test_classes: true,
        }
    }
}

/// Accepts `1/true/yes/on` and `0/false/no/off`, case-insensitively.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ReportConfig {
    /// Parses a YAML config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        debug!("Loaded report config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if given and present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            Some(path) => {
                debug!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Applies `TALLY_*` environment variables.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable source.
    ///
    /// Unparsable boolean values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            self.output_directory = PathBuf::from(dir);
        }
        if let Some(name) = lookup(ENV_REPORT_FILE).filter(|v| !v.is_empty()) {
            self.report_file_name = name;
        }

        let flags: [(&str, &mut bool); 3] = [
            (ENV_PRETTY_PRINT, &mut self.pretty_print),
            (ENV_SAMPLE_DATA, &mut self.generate_sample_data),
            (ENV_SCAN, &mut self.scan_test_classes),
        ];
        for (key, slot) in flags {
            let Some(raw) = lookup(key) else { continue };
            match parse_flag(&raw) {
                Some(value) => *slot = value,
                None => debug!("Ignoring {}={}: not a boolean", key, raw),
            }
        }
        self
    }

    /// Full path of the report file.
    pub fn report_path(&self) -> PathBuf {
        self.output_directory.join(&self.report_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.output_directory, PathBuf::from("target/test-reports"));
        assert_eq!(config.report_file_name, "custom-test-report.json");
        assert!(config.pretty_print);
        assert!(!config.generate_sample_data);
        assert!(config.scan_test_classes);
        assert_eq!(
            config.report_path(),
            PathBuf::from("target/test-reports/custom-test-report.json")
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tally.yml");
        std::fs::write(&path, "reportFileName: nightly.json\ngenerateSampleData: true\n").unwrap();

        let config = ReportConfig::from_file(&path).unwrap();
        assert_eq!(config.report_file_name, "nightly.json");
        assert!(config.generate_sample_data);
        assert!(config.pretty_print);
        assert!(config.scan_test_classes);
        assert_eq!(config.output_directory, PathBuf::from("target/test-reports"));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tally.yml");
        std::fs::write(&path, "prettyPrint: [not, a, bool]\n").unwrap();

        assert!(matches!(
            ReportConfig::from_file(&path),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ReportConfig::load(Some(&temp_dir.path().join("absent.yml"))).unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(ReportConfig::load(None).unwrap(), ReportConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ReportConfig::default().with_overrides_from(lookup_from(&[
            (ENV_OUTPUT_DIR, "/tmp/reports"),
            (ENV_REPORT_FILE, "ci.json"),
            (ENV_PRETTY_PRINT, "off"),
            (ENV_SAMPLE_DATA, "YES"),
            (ENV_SCAN, "maybe"),
        ]));

        assert_eq!(config.report_path(), PathBuf::from("/tmp/reports/ci.json"));
        assert!(!config.pretty_print);
        assert!(config.generate_sample_data);
        // unparsable, keeps the default
        assert!(config.scan_test_classes);
    }

    #[test]
    fn test_empty_overrides_are_ignored() {
        let config = ReportConfig::default()
            .with_overrides_from(lookup_from(&[(ENV_OUTPUT_DIR, ""), (ENV_REPORT_FILE, "")]));
        assert_eq!(config, ReportConfig::default());
    }
}
