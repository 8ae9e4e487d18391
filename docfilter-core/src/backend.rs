//! Execution of compiled filters against a storage backend.
//!
//! The compiler itself performs no I/O. A [`FilterStore`] takes the query a
//! backend emitter produced and runs it, the way the storage engines expose
//! `find`, `count` and `project` for compiled filters.
//!
//! # Examples
//!
//! ```ignore
//! use docfilter::{Backend, BackendQuery, compile};
//! use docfilter_core::{backend::FilterStore, query::FindOptions};
//!
//! let BackendQuery::Row(filter) = compile("age >= 18", &metadata, Backend::PredicateObject)? else {
//!     unreachable!()
//! };
//! let adults = store.find("persons", &filter, FindOptions::new()).await?;
//! ```

use async_trait::async_trait;
use bson::Bson;
use std::fmt::Debug;

use crate::{error::FilterResult, query::FindOptions};


/// A storage backend that executes filters compiled for it.
///
/// Implementations must be thread-safe; how concurrent calls are coordinated
/// is up to the implementation.
#[async_trait]
pub trait FilterStore: Send + Sync + Debug {
    /// The query representation this store executes.
    type Filter: Send + Sync;

    /// Returns the documents of `collection` matching `filter`.
    async fn find(
        &self,
        collection: &str,
        filter: &Self::Filter,
        options: FindOptions,
    ) -> FilterResult<Vec<Bson>>;

    /// Counts the documents of `collection` matching `filter`.
    async fn count(&self, collection: &str, filter: &Self::Filter) -> FilterResult<u64>;

    /// Like [`FilterStore::find`], but every returned document only keeps the
    /// named fields. Dotted names select embedded fields.
    async fn project(
        &self,
        collection: &str,
        filter: &Self::Filter,
        fields: &[&str],
        options: FindOptions,
    ) -> FilterResult<Vec<Bson>>;
}

#[async_trait]
impl<S> FilterStore for &S
where
    S: FilterStore,
{
    type Filter = S::Filter;

    async fn find(
        &self,
        collection: &str,
        filter: &Self::Filter,
        options: FindOptions,
    ) -> FilterResult<Vec<Bson>> {
        (*self).find(collection, filter, options).await
    }

    async fn count(&self, collection: &str, filter: &Self::Filter) -> FilterResult<u64> {
        (*self).count(collection, filter).await
    }

    async fn project(
        &self,
        collection: &str,
        filter: &Self::Filter,
        fields: &[&str],
        options: FindOptions,
    ) -> FilterResult<Vec<Bson>> {
        (*self)
            .project(collection, filter, fields, options)
            .await
    }
}
