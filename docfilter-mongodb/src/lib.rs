//! MongoDB document-operator backend for docfilter.
//!
//! [`DocumentEmitter`] renders compiled predicates as MongoDB query documents
//! (`{"age": {"$gte": 18}}`). The emitter has no driver dependency; executing
//! the documents against a server needs the `driver` feature, which provides
//! [`MongoDbStore`](store::MongoDbStore):
//!
//! ```toml
//! [dependencies]
//! docfilter = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use docfilter_core::{backend::FilterStore, query::FindOptions};
//! use docfilter_mongodb::MongoDbStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "my_database")
//!         .build()
//!         .await?;
//!     let adults = store.count("persons", &bson::doc! { "age": { "$gte": 18 } }).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod query;
#[cfg(feature = "driver")]
pub mod store;

pub use query::DocumentEmitter;
#[cfg(feature = "driver")]
pub use store::{MongoDbStore, MongoDbStoreBuilder};
