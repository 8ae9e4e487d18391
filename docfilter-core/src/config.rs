//! Compiler configuration.
//!
//! [`CompileOptions`] selects the storage backend and the policy for fields the
//! model does not define. It deserializes from the host's configuration
//! document, with every key optional:
//!
//! ```
//! use docfilter_core::config::{Backend, CompileOptions, FieldPolicy};
//!
//! let options: CompileOptions =
//!     serde_json::from_str(r#"{"backend": "mongodb", "unknown_fields": "strict"}"#).unwrap();
//!
//! assert_eq!(options.backend, Backend::DocumentOperator);
//! assert_eq!(options.unknown_fields, FieldPolicy::Strict);
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};


/// The family of storage backend a filter is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Dict-shaped operator queries over BSON (MongoDB).
    #[default]
    #[serde(alias = "mongodb")]
    DocumentOperator,
    /// Dict-shaped operator queries over plain JSON (ArangoDB).
    #[serde(alias = "arangodb")]
    JsonDocument,
    /// Composable row-predicate objects (in-memory rows, RethinkDB style).
    #[serde(alias = "memory", alias = "rethinkdb")]
    PredicateObject,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::DocumentOperator => "document_operator",
            Backend::JsonDocument => "json_document",
            Backend::PredicateObject => "predicate_object",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document_operator" | "mongodb" => Ok(Backend::DocumentOperator),
            "json_document" | "arangodb" => Ok(Backend::JsonDocument),
            "predicate_object" | "memory" | "rethinkdb" => Ok(Backend::PredicateObject),
            other => Err(format!("Unknown storage backend: {other}")),
        }
    }
}

/// What to do with a clause on a field the model does not define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPolicy {
    /// Drop the clause and log a warning. A misspelled field widens the result set.
    #[default]
    Permissive,
    /// Fail compilation with [`BuildError::UnknownField`](crate::error::BuildError::UnknownField).
    Strict,
}

/// Options controlling one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// The backend the filter is emitted for.
    pub backend: Backend,
    /// Handling of unknown fields.
    pub unknown_fields: FieldPolicy,
}

impl CompileOptions {
    pub fn new() -> Self {
        CompileOptions::default()
    }

    pub fn builder() -> CompileOptionsBuilder {
        CompileOptionsBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptionsBuilder {
    options: CompileOptions,
}

impl CompileOptionsBuilder {
    pub fn new() -> Self {
        CompileOptionsBuilder { options: CompileOptions::default() }
    }

    /// Sets the backend the filter is emitted for.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.options.backend = backend;
        self
    }

    /// Sets the unknown-field policy.
    pub fn unknown_fields(mut self, policy: FieldPolicy) -> Self {
        self.options.unknown_fields = policy;
        self
    }

    /// Rejects unknown fields.
    pub fn strict(self) -> Self {
        self.unknown_fields(FieldPolicy::Strict)
    }

    pub fn build(self) -> CompileOptions {
        self.options
    }
}
