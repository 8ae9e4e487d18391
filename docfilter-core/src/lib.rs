//! The backend-independent core of the docfilter filter-expression compiler.
//!
//! This crate turns a restricted boolean expression over named fields into a
//! backend-agnostic [`Predicate`](predicate::Predicate) and defines the seams
//! the backend crates plug into:
//!
//! - **Expressions** ([`ast`], [`parser`]) - The fixed grammar and its syntax tree
//! - **Field metadata** ([`metadata`], [`atom`]) - Per-field coercion functions and multiplicity
//! - **Coercion** ([`coerce`]) - Convert-then-write mapping of literals
//! - **Predicates** ([`predicate`]) - The intermediate predicate tree and its builder
//! - **Emitters** ([`emit`]) - The capability trait every backend emitter implements
//! - **Compilation** ([`compile`]) - The parse and build pipeline
//! - **Configuration** ([`config`]) - Backend selection and unknown-field policy
//! - **Execution** ([`backend`], [`query`]) - Async stores running compiled filters
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```
//! use docfilter_core::{
//!     compile::compile_predicate,
//!     config::FieldPolicy,
//!     metadata::{FieldMeta, ModelMetadata},
//!     predicate::Predicate,
//! };
//!
//! let metadata = ModelMetadata::builder()
//!     .field("lastname", FieldMeta::new())
//!     .field("birthyear", FieldMeta::new())
//!     .build();
//!
//! let predicate = compile_predicate(
//!     r#"lastname == "Jones" and birthyear in (1900, 1950)"#,
//!     &metadata,
//!     FieldPolicy::Permissive,
//! )
//! .unwrap();
//!
//! assert!(matches!(predicate, Predicate::And(ref clauses) if clauses.len() == 2));
//! ```

pub mod ast;
pub mod atom;
pub mod backend;
pub mod coerce;
pub mod compile;
pub mod config;
pub mod emit;
pub mod error;
mod lexer;
pub mod metadata;
pub mod parser;
pub mod predicate;
pub mod query;
