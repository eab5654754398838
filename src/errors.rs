//! Crate-wide error type.
//!
//! Five failure kinds stay distinct so callers can react to each:
//! validation failures (structured, aggregated), compile-time shape errors,
//! unexpected keyword names, sequence search misses, and attribute lookups
//! on names the schema never declared.

use thiserror::Error;

use crate::schema::Invalid;

/// Result type for content type operations
pub type ConformResult<T> = Result<T, Error>;

/// Errors raised by compilation, construction, and mutation.
#[derive(Debug, Clone, Error)]
pub enum Error {
    // ==================
    // Validation
    // ==================
    /// A value failed a schema node's deserialize step. Carries the full
    /// per-field/per-index breakdown.
    #[error(transparent)]
    Invalid(#[from] Invalid),

    // ==================
    // Compile-time shape errors
    // ==================
    /// The schema handed to the compiler is not rooted at a mapping.
    #[error("schema must be a mapping schema, got {actual}")]
    NotAMapping { actual: &'static str },

    /// A node that must name an attribute has an empty name.
    #[error("schema node requires a non-empty name")]
    UnnamedNode,

    // ==================
    // Record shape
    // ==================
    /// Keyword/record input contained names not present in the schema.
    /// Checked only after field validation, so real validation mistakes are
    /// never masked by an extraneous key.
    #[error("unexpected keyword argument(s): {}", .keys.join(", "))]
    UnexpectedKeywords { keys: Vec<String> },

    /// A declared attribute name was expected but this one is unknown.
    #[error("no such attribute: {0}")]
    NoSuchAttribute(String),

    /// An attribute holds a different shape than the accessor asked for.
    #[error("{location} holds a {actual} value, not a {expected}")]
    WrongShape {
        location: String,
        expected: &'static str,
        actual: &'static str,
    },

    // ==================
    // Sequence operations
    // ==================
    /// A search/removal target is absent. Not a validation condition.
    #[error("value not found in sequence")]
    NotFound,

    /// A positional access landed outside the sequence.
    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    // ==================
    // Registry
    // ==================
    /// A content type with this name is already registered.
    #[error("content type '{0}' is already registered")]
    DuplicateType(String),

    /// No content type with this name is registered.
    #[error("content type '{0}' is not registered")]
    UnknownType(String),
}
