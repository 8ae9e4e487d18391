//! Convenient re-exports of commonly used types from docfilter.
//!
//! ```ignore
//! use docfilter::prelude::*;
//! ```
//!
//! This provides access to:
//! - The compiler entry points and backend queries
//! - Field metadata and standard atoms
//! - Predicates and the emitter trait
//! - Execution stores and find options
//! - Error types

pub use crate::{BackendQuery, Compiler, compile};

pub use docfilter_core::{
    atom::{Atom, Storage},
    backend::FilterStore,
    config::{Backend, CompileOptions, CompileOptionsBuilder, FieldPolicy},
    emit::{Connective, Emitter, MultiplicityPolicy},
    error::{BuildError, CoercionError, FilterError, FilterResult, ParseError},
    metadata::{FieldMeta, ModelMetadata, ModelMetadataBuilder},
    predicate::{Operator, Predicate, PredicateBuilder},
    query::{FindOptions, FindOptionsBuilder, Sort, SortDirection},
};
pub use docfilter_arangodb::JsonEmitter;
pub use docfilter_memory::{InMemoryStore, RowEmitter, RowExpr};
pub use docfilter_mongodb::DocumentEmitter;
