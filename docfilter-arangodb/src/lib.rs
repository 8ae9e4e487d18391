//! ArangoDB JSON document-operator backend for docfilter.
//!
//! [`JsonEmitter`] renders compiled predicates as `serde_json::Value` operator
//! documents. Field metadata for this backend should use
//! [`Storage::Json`](docfilter_core::atom::Storage::Json) so that dates and
//! UUIDs are compared in the string form ArangoDB stores them in.
//!
//! # Example
//!
//! ```
//! use docfilter_arangodb::JsonEmitter;
//! use docfilter_core::{
//!     compile::emit_with,
//!     config::FieldPolicy,
//!     metadata::{FieldMeta, ModelMetadata},
//! };
//! use serde_json::json;
//!
//! let metadata = ModelMetadata::builder().field("age", FieldMeta::new()).build();
//! let query = emit_with(&mut JsonEmitter::new(), "age > 30", &metadata, FieldPolicy::Permissive).unwrap();
//!
//! assert_eq!(query, json!({ "age": { "$gt": 30 } }));
//! ```

pub mod json;
pub mod query;

pub use query::JsonEmitter;
