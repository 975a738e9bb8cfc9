//! Test method descriptors and the eligibility heuristic.

use crate::declaration::TestMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A marker placed on a test by another test framework.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FrameworkMarker {
    /// The built-in `#[test]` attribute.
    Test,
    /// `#[tokio::test]`.
    Tokio,
    /// `#[rstest]`.
    Rstest,
    /// Any other framework, by name.
    Other(String),
}

impl From<String> for FrameworkMarker {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "test" => FrameworkMarker::Test,
            "tokio" | "tokio::test" => FrameworkMarker::Tokio,
            "rstest" => FrameworkMarker::Rstest,
            _ => FrameworkMarker::Other(value),
        }
    }
}

impl From<FrameworkMarker> for String {
    fn from(marker: FrameworkMarker) -> Self {
        marker.to_string()
    }
}

impl fmt::Display for FrameworkMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameworkMarker::Test => write!(f, "test"),
            FrameworkMarker::Tokio => write!(f, "tokio"),
            FrameworkMarker::Rstest => write!(f, "rstest"),
            FrameworkMarker::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Everything known about one test method before it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDescriptor {
    /// Qualified name of the owning class or module.
    pub class_name: String,
    /// Method or function name.
    pub method_name: String,
    /// Declared classification.
    #[serde(default)]
    pub metadata: TestMetadata,
    /// Foreign framework markers present on the method.
    #[serde(default)]
    pub markers: Vec<FrameworkMarker>,
}

impl TestDescriptor {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            metadata: TestMetadata::default(),
            markers: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: TestMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_marker(mut self, marker: FrameworkMarker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Identifier used by the execution registry: `class#method`.
    pub fn id(&self) -> String {
        format!("{}#{}", self.class_name, self.method_name)
    }

    /// Returns true if this method should be tracked.
    ///
    /// A method qualifies when its name mentions "test" (case-insensitive),
    /// when it declares any classification metadata, or when another test
    /// framework has marked it.
    pub fn is_test_method(&self) -> bool {
        self.method_name.to_ascii_lowercase().contains("test")
            || !self.metadata.is_empty()
            || !self.markers.is_empty()
    }
}

/// A class (or module) holding candidate test methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestClass {
    pub name: String,
    /// Compiler-generated types are never scanned.
    #[serde(default)]
    pub synthetic: bool,
    #[serde(default)]
    pub methods: Vec<TestDescriptor>,
}

impl TestClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            synthetic: false,
            methods: Vec::new(),
        }
    }

    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// Adds a method whose class name is this class.
    pub fn with_method(mut self, method_name: impl Into<String>, metadata: TestMetadata) -> Self {
        self.methods
            .push(TestDescriptor::new(self.name.clone(), method_name).with_metadata(metadata));
        self
    }

    /// Returns false for synthetic and nested helper types.
    pub fn is_scannable(&self) -> bool {
        !self.synthetic && !self.name.contains('$') && !self.name.contains("{{")
    }

    /// Methods that pass the test-method heuristic.
    pub fn test_methods(&self) -> impl Iterator<Item = &TestDescriptor> {
        self.methods.iter().filter(|m| m.is_test_method())
    }
}
