//! Declared metadata for a single test method.
//!
//! `TestMetadata` is the statically-typed declaration attached to a test at
//! registration time. Every field is optional so that "not declared" stays
//! distinguishable from "declared with the default value".
//!
//! `RawMetadata` is the loose key-value form that arrives from manifests and
//! other untyped sources. Converting it with [`TestMetadata::from_raw`] never
//! fails: a fragment that cannot be interpreted is skipped and logged.
//!
//! # Example
//!
//! ```
//! use tally_proto::{Priority, Severity, TestMetadata};
//!
//! let meta = TestMetadata::new()
//!     .with_name("User login")
//!     .with_severity(Severity::Critical)
//!     .with_priority(Priority::P0)
//!     .with_step(1, "Open login page")
//!     .with_step(2, "Submit credentials");
//!
//! assert_eq!(meta.steps.len(), 2);
//! assert!(meta.test_level.is_none());
//! ```

use crate::classification::{Priority, Severity, TestLevel, TestMethodology, TestType};
use crate::error::ProtoError;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Version recorded when an info block is declared without one.
pub const DEFAULT_INFO_VERSION: &str = "1.0";

/// A declared sub-action of a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDecl {
    /// Identity of the step within its test. Not validated for uniqueness.
    pub order: i32,
    /// What the step does.
    pub description: String,
}

impl StepDecl {
    pub fn new(order: i32, description: impl Into<String>) -> Self {
        Self {
            order,
            description: description.into(),
        }
    }
}

/// Ordering, naming and grouping of a test case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseDecl {
    /// Declared execution order; `None` means "run last".
    pub order: Option<i32>,
    /// Human-readable name; `None` or empty falls back to the method name.
    pub name: Option<String>,
    /// Grouping used by the category summary.
    pub category: Option<String>,
}

/// Authorship and free-text description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestInfoDecl {
    pub author: Option<String>,
    /// Falls back to [`DEFAULT_INFO_VERSION`] when the block is declared.
    pub version: Option<String>,
    pub description: Option<String>,
}

/// Structured classification metadata declared on a test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMetadata {
    pub test_case: Option<TestCaseDecl>,
    pub severity: Option<Severity>,
    pub priority: Option<Priority>,
    pub test_level: Option<TestLevel>,
    pub test_type: Option<TestType>,
    pub test_method: Option<TestMethodology>,
    pub info: Option<TestInfoDecl>,
    /// Declared steps, in declaration order.
    pub steps: Vec<StepDecl>,
}

impl TestMetadata {
    /// Creates an empty declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing at all was declared.
    pub fn is_empty(&self) -> bool {
        self.test_case.is_none()
            && self.severity.is_none()
            && self.priority.is_none()
            && self.test_level.is_none()
            && self.test_type.is_none()
            && self.test_method.is_none()
            && self.info.is_none()
            && self.steps.is_empty()
    }

    fn test_case_mut(&mut self) -> &mut TestCaseDecl {
        self.test_case.get_or_insert_with(TestCaseDecl::default)
    }

    fn info_mut(&mut self) -> &mut TestInfoDecl {
        self.info.get_or_insert_with(TestInfoDecl::default)
    }

    /// Declares the execution order.
    pub fn with_order(mut self, order: i32) -> Self {
        self.test_case_mut().order = Some(order);
        self
    }

    /// Declares the human-readable name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.test_case_mut().name = Some(name.into());
        self
    }

    /// Declares the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.test_case_mut().category = Some(category.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_level(mut self, level: TestLevel) -> Self {
        self.test_level = Some(level);
        self
    }

    pub fn with_type(mut self, test_type: TestType) -> Self {
        self.test_type = Some(test_type);
        self
    }

    pub fn with_methodology(mut self, methodology: TestMethodology) -> Self {
        self.test_method = Some(methodology);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.info_mut().author = Some(author.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.info_mut().version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.info_mut().description = Some(description.into());
        self
    }

    /// Appends a declared step. Order values are kept verbatim.
    pub fn with_step(mut self, order: i32, description: impl Into<String>) -> Self {
        self.steps.push(StepDecl::new(order, description));
        self
    }

    /// Interprets a raw key-value declaration.
    ///
    /// Unknown keys and values that cannot be parsed are skipped, leaving the
    /// corresponding field undeclared. Keys are matched ignoring case, `_`
    /// and `-`, so `testLevel`, `test_level` and `test-level` are equivalent.
    pub fn from_raw(raw: &RawMetadata) -> Self {
        let mut meta = Self::default();

        for (key, value) in &raw.fields {
            let normalized: String = key
                .chars()
                .filter(|c| *c != '_' && *c != '-')
                .map(|c| c.to_ascii_lowercase())
                .collect();

            match normalized.as_str() {
                "order" => match parse_order(value) {
                    Ok(order) => meta.test_case_mut().order = Some(order),
                    Err(e) => skip_fragment(key, value, &e.to_string()),
                },
                "name" => meta.test_case_mut().name = Some(value.clone()),
                "category" => meta.test_case_mut().category = Some(value.clone()),
                "severity" => set_parsed(&mut meta.severity, key, value),
                "priority" => set_parsed(&mut meta.priority, key, value),
                "testlevel" | "level" => set_parsed(&mut meta.test_level, key, value),
                "testtype" | "type" => set_parsed(&mut meta.test_type, key, value),
                "testmethod" | "methodology" => set_parsed(&mut meta.test_method, key, value),
                "author" => meta.info_mut().author = Some(value.clone()),
                "version" => meta.info_mut().version = Some(value.clone()),
                "description" => meta.info_mut().description = Some(value.clone()),
                _ => debug!("Ignoring unrecognised metadata key '{}'", key),
            }
        }

        for step in &raw.steps {
            match parse_order(&step.order) {
                Ok(order) => meta.steps.push(StepDecl::new(order, step.description.clone())),
                Err(e) => skip_fragment("step.order", &step.order, &e.to_string()),
            }
        }

        meta
    }
}

fn parse_order(value: &str) -> Result<i32, ProtoError> {
    value
        .trim()
        .parse()
        .map_err(|_| ProtoError::InvalidOrder(value.to_string()))
}

/// Stores `value` in `slot` if it parses. A bad value leaves `slot`
/// untouched, including a value set earlier under an alias key.
fn set_parsed<T>(slot: &mut Option<T>, key: &str, value: &str)
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value.parse::<T>() {
        Ok(parsed) => *slot = Some(parsed),
        Err(e) => skip_fragment(key, value, &e.to_string()),
    }
}

fn skip_fragment(key: &str, value: &str, reason: &str) {
    debug!(
        "Skipping metadata fragment {}='{}' ({}), keeping default",
        key, value, reason
    );
}

/// A step as it arrives from an untyped source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStep {
    #[serde(deserialize_with = "scalar_string")]
    pub order: String,
    #[serde(default)]
    pub description: String,
}

impl RawStep {
    pub fn new(order: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            order: order.into(),
            description: description.into(),
        }
    }
}

/// Untyped key-value declaration.
///
/// Scalar values of any YAML/JSON type (numbers, booleans) are accepted and
/// kept as their string form, so `order: 3` and `order: "3"` are the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetadata {
    #[serde(default, deserialize_with = "scalar_string_map")]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub steps: Vec<RawStep>,
}

impl RawMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any previous value for the key.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_step(mut self, order: impl Into<String>, description: impl Into<String>) -> Self {
        self.steps.push(RawStep::new(order, description));
        self
    }
}

/// A scalar of any primitive type, captured as text.
struct ScalarString(String);

impl<'de> Deserialize<'de> for ScalarString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ScalarVisitor;

        impl Visitor<'_> for ScalarVisitor {
            type Value = ScalarString;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(ScalarString(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    ScalarString::deserialize(deserializer).map(|s| s.0)
}

fn scalar_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = BTreeMap::<String, ScalarString>::deserialize(deserializer)?;
    Ok(map.into_iter().map(|(k, v)| (k, v.0)).collect())
}
