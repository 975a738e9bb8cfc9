//! # tally-proto
//!
//! Classification vocabulary and test declarations for Tally.
//!
//! This crate holds the declarative side of the system:
//! - The classification axes (severity, priority, level, type, methodology)
//! - Structured per-test metadata and its untyped key-value form
//! - Test descriptors and the eligibility heuristic
//!
//! It carries no runtime state; `tally-core` consumes these types.

mod classification;
mod declaration;
mod descriptor;
mod error;

pub use classification::{Priority, Severity, TestLevel, TestMethodology, TestType};
pub use declaration::{
    DEFAULT_INFO_VERSION, RawMetadata, RawStep, StepDecl, TestCaseDecl, TestInfoDecl,
    TestMetadata,
};
pub use descriptor::{FrameworkMarker, TestClass, TestDescriptor};
pub use error::ProtoError;
