//! Errors raised while interpreting declared metadata.

use thiserror::Error;

/// Errors that can occur when parsing a metadata fragment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtoError {
    /// A classification label that is not part of the vocabulary.
    #[error("unknown {kind} value: {value}")]
    UnknownValue { kind: &'static str, value: String },

    /// An order value that is not an integer.
    #[error("invalid order value: {0}")]
    InvalidOrder(String),
}
