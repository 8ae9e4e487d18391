//! In-memory predicate-object backend for docfilter.
//!
//! Filters compiled for this backend are [`RowExpr`](row::RowExpr) values:
//! composable row predicates in the style of RethinkDB's `r.row` queries. They
//! can be evaluated directly against BSON documents or run through the
//! [`InMemoryStore`].
//!
//! # Features
//!
//! - **Composable predicates** - `row(field).ge(v).and(...)`, `any(field, element().eq(v))`
//! - **Emitter** - [`RowEmitter`] turns compiled predicates into row expressions
//! - **Execution** - [`InMemoryStore`] implements `find`, `count` and `project`
//!
//! # Quick Start
//!
//! ```
//! use bson::doc;
//! use docfilter_core::{
//!     compile::emit_with,
//!     config::FieldPolicy,
//!     metadata::{FieldMeta, ModelMetadata},
//! };
//! use docfilter_memory::RowEmitter;
//!
//! let metadata = ModelMetadata::builder()
//!     .field("age", FieldMeta::new())
//!     .field("tags", FieldMeta::new().multiple(true))
//!     .build();
//!
//! let filter = emit_with(
//!     &mut RowEmitter::new(),
//!     "age >= 18 and tags == 'admin'",
//!     &metadata,
//!     FieldPolicy::Permissive,
//! )
//! .unwrap();
//!
//! assert!(filter.matches(&doc! { "age": 30, "tags": ["staff", "admin"] }));
//! assert!(!filter.matches(&doc! { "age": 30, "tags": ["staff"] }));
//! ```

pub mod emitter;
mod evaluator;
pub mod row;
pub mod store;

pub use emitter::RowEmitter;
pub use row::RowExpr;
pub use store::{InMemoryStore, InMemoryStoreBuilder};
