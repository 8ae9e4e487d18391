//! Compiles restricted filter expressions into native queries for document stores.
//!
//! This crate is the primary entry point of docfilter. It re-exports the core
//! types and dispatches compiled predicates to the emitter of the configured
//! backend.
//!
//! # Features
//!
//! - **One expression language** - `lastname == "Jones" and birthyear in (1900, 1950)`
//! - **Field-aware coercion** - literals are converted and written through per-field functions
//! - **Multiple backends** - MongoDB operator documents, ArangoDB JSON documents and
//!   composable in-memory row predicates
//! - **Execution adapters** - `find`, `count` and `project` over compiled filters
//!
//! # Quick Start
//!
//! ```
//! use docfilter::prelude::*;
//! use docfilter::bson::doc;
//!
//! let metadata = ModelMetadata::builder()
//!     .field("lastname", FieldMeta::new())
//!     .field("birthyear", Atom::Integer.field_meta(Storage::Native))
//!     .build();
//!
//! let query = compile(
//!     r#"lastname == "Jones" and birthyear in ("1900", "1950")"#,
//!     &metadata,
//!     Backend::DocumentOperator,
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     query.as_document(),
//!     Some(&doc! { "$and": [
//!         { "lastname": { "$eq": "Jones" } },
//!         { "birthyear": { "$gte": 1900_i64, "$lte": 1950_i64 } },
//!     ] })
//! );
//! ```
//!
//! # Configuration
//!
//! A [`Compiler`] binds the metadata of one model to [`CompileOptions`], which
//! can be read from the host's configuration:
//!
//! ```
//! use docfilter::prelude::*;
//!
//! let metadata = ModelMetadata::builder().field("age", FieldMeta::new()).build();
//! let options: CompileOptions = serde_json::from_str(r#"{"backend": "memory", "unknown_fields": "strict"}"#).unwrap();
//! let compiler = Compiler::with_options(&metadata, options);
//!
//! assert!(compiler.compile("agee > 3").is_err());
//! assert!(compiler.compile("age > 3").unwrap().as_row().is_some());
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory row predicates and store
//! - [`mongodb`] - MongoDB query documents (the store requires the `mongodb` feature)
//! - [`arangodb`] - ArangoDB JSON query documents

pub mod prelude;

use bson::Document;
use serde_json::Value;
use tracing::trace;

use docfilter_core::{
    compile::compile_predicate,
    config::{Backend, CompileOptions, FieldPolicy},
    emit::Emitter,
    error::FilterResult,
    metadata::ModelMetadata,
    predicate::Predicate,
};
use docfilter_arangodb::JsonEmitter;
use docfilter_memory::{RowEmitter, RowExpr};
use docfilter_mongodb::DocumentEmitter;

pub use docfilter_core::{ast, atom, backend, coerce, compile, config, emit, error, metadata, parser, predicate, query};

// Re-export BSON types for convenience
pub use bson;

/// In-memory predicate-object backend.
pub mod memory {
    pub use docfilter_memory::{InMemoryStore, InMemoryStoreBuilder, RowEmitter, RowExpr, row};
}

/// MongoDB document-operator backend.
///
/// The store is only available when the `mongodb` feature is enabled.
pub mod mongodb {
    pub use docfilter_mongodb::DocumentEmitter;
    #[cfg(feature = "mongodb")]
    pub use docfilter_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}

/// ArangoDB JSON document-operator backend.
pub mod arangodb {
    pub use docfilter_arangodb::{JsonEmitter, json::to_json};
}

/// A query in the native representation of one backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendQuery {
    /// A MongoDB query document.
    Document(Document),
    /// An ArangoDB JSON query document.
    Json(Value),
    /// An in-memory row predicate.
    Row(RowExpr),
}

impl BackendQuery {
    /// The backend this query was emitted for.
    pub fn backend(&self) -> Backend {
        match self {
            BackendQuery::Document(_) => Backend::DocumentOperator,
            BackendQuery::Json(_) => Backend::JsonDocument,
            BackendQuery::Row(_) => Backend::PredicateObject,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            BackendQuery::Document(document) => Some(document),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            BackendQuery::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_row(&self) -> Option<&RowExpr> {
        match self {
            BackendQuery::Row(expr) => Some(expr),
            _ => None,
        }
    }
}

/// Compiles filter expressions for one model.
///
/// A compiler only borrows the metadata, so any number of compilers on any
/// number of threads can share one [`ModelMetadata`].
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'m> {
    metadata: &'m ModelMetadata,
    options: CompileOptions,
}

impl<'m> Compiler<'m> {
    /// A compiler with the default options: MongoDB documents, unknown fields dropped.
    pub fn new(metadata: &'m ModelMetadata) -> Self {
        Self::with_options(metadata, CompileOptions::default())
    }

    pub fn with_options(metadata: &'m ModelMetadata, options: CompileOptions) -> Self {
        Self { metadata, options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Parses and builds the backend-agnostic predicate of `expr`.
    pub fn predicate(&self, expr: &str) -> FilterResult<Predicate> {
        compile_predicate(expr, self.metadata, self.options.unknown_fields)
    }

    /// Compiles `expr` into the configured backend's query.
    pub fn compile(&self, expr: &str) -> FilterResult<BackendQuery> {
        Ok(self.emit(&self.predicate(expr)?))
    }

    /// Emits an already built predicate for the configured backend.
    pub fn emit(&self, predicate: &Predicate) -> BackendQuery {
        let backend = self.options.backend;
        let query = match backend {
            Backend::DocumentOperator => BackendQuery::Document(DocumentEmitter.emit(predicate, self.metadata)),
            Backend::JsonDocument => BackendQuery::Json(JsonEmitter.emit(predicate, self.metadata)),
            Backend::PredicateObject => BackendQuery::Row(RowEmitter.emit(predicate, self.metadata)),
        };

        trace!(backend = %backend, query = ?query, "emitted filter query");
        query
    }
}

/// Compiles `expr` for `backend`, dropping clauses on unknown fields.
pub fn compile(expr: &str, metadata: &ModelMetadata, backend: Backend) -> FilterResult<BackendQuery> {
    let options = CompileOptions::builder()
        .backend(backend)
        .unknown_fields(FieldPolicy::Permissive)
        .build();

    Compiler::with_options(metadata, options).compile(expr)
}
