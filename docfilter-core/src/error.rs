//! Error types and result types for filter compilation.
//!
//! Each stage of the pipeline has its own error type: [`ParseError`] for
//! malformed expressions, [`BuildError`] for expressions that parse but cannot
//! be translated, and [`CoercionError`] for literals rejected by a field's
//! convert or write function. All of them fold into [`FilterError`], which is
//! what [`FilterResult<T>`] carries.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// A malformed filter expression.
///
/// `offset` is the byte offset into the expression where the problem was found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    /// Human readable description of the problem.
    pub message: String,
    /// Byte offset into the source expression.
    pub offset: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        ParseError { message: message.into(), offset }
    }
}

/// A syntactically valid expression that cannot be turned into a predicate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The expression references a field the model does not define.
    /// Only raised when unknown fields are rejected.
    #[error("Unknown field: {0}")]
    UnknownField(String),
    /// An operand has a shape the comparison cannot use,
    /// e.g. a literal on the left-hand side or a scalar after `in`.
    #[error("Unsupported operand: {0}")]
    UnsupportedOperand(String),
    /// The right-hand side of `%` is not a valid regular expression.
    #[error("Invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        pattern: String,
        message: String,
    },
}

/// A literal rejected by a field's convert or write function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot coerce {literal:?} for field {field}: {message}")]
pub struct CoercionError {
    /// The field whose functions rejected the literal.
    pub field: String,
    /// The literal as written in the expression.
    pub literal: String,
    /// The message reported by the failing function.
    pub message: String,
}

/// Represents all possible errors that can occur while compiling or running a filter.
#[derive(Error, Debug)]
pub enum FilterError {
    /// The expression is not well formed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// The expression could not be translated into a predicate.
    #[error("Build error: {0}")]
    Build(#[from] BuildError),
    /// A literal could not be coerced to its storage representation.
    #[error("Coercion error: {0}")]
    Coercion(#[from] CoercionError),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// Serialization/deserialization error when converting between value formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A specialized `Result` type for filter compilation and execution.
pub type FilterResult<T> = Result<T, FilterError>;

impl From<BsonError> for FilterError {
    fn from(err: BsonError) -> Self {
        FilterError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for FilterError {
    fn from(err: SerdeJsonError) -> Self {
        FilterError::Serialization(err.to_string())
    }
}
