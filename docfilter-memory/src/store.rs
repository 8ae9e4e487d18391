//! In-memory execution of row expressions.
//!
//! [`InMemoryStore`] keeps rows as BSON documents grouped by collection behind
//! an async-aware read-write lock and runs compiled [`RowExpr`] filters against
//! them with a full scan.

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document};

use docfilter_core::{
    backend::FilterStore,
    error::FilterResult,
    query::{FindOptions, SortDirection},
};

use crate::{
    evaluator::{RowEvaluator, resolve, sort_order},
    row::RowExpr,
};

type StoreMap = HashMap<String, Vec<Document>>;


/// Thread-safe in-memory row store.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so
/// clones share the same rows. Rows keep their insertion order, which is also
/// the result order when no sort is requested.
///
/// # Example
///
/// ```ignore
/// use bson::doc;
/// use docfilter_core::{backend::FilterStore, query::FindOptions};
/// use docfilter_memory::{InMemoryStore, row::row};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///     store.insert("persons", vec![doc! { "name": "Alice", "age": 30 }]).await;
///
///     let found = store.find("persons", &row("age").ge(18), FindOptions::new()).await?;
///     assert_eq!(found.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> rows
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Appends rows to a collection, creating it if needed.
    pub async fn insert(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        self.store
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    /// Lists the names of all collections.
    pub async fn collections(&self) -> Vec<String> {
        self.store
            .read()
            .await
            .keys()
            .cloned()
            .collect()
    }

    /// Filters, sorts and pages the rows of a collection.
    async fn select(&self, collection: &str, filter: &RowExpr, options: &FindOptions) -> Vec<Document> {
        let store = self.store.read().await;
        let Some(rows) = store.get(collection) else {
            return vec![];
        };

        let mut matched = RowEvaluator::filter_documents(rows, filter);

        if let Some(sort) = &options.sort {
            matched.sort_by(|a, b| {
                let ordering = sort_order(resolve(a, &sort.field), resolve(b, &sort.field));
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        matched
            .into_iter()
            .skip(options.skip.unwrap_or(0) as usize)
            .take(options.limit.map_or(usize::MAX, |limit| limit as usize))
            .cloned()
            .collect()
    }
}

/// Copies the named fields of `document`, keeping embedded structure for dotted paths.
fn project_fields(document: &Document, fields: &[&str]) -> Document {
    let mut projected = Document::new();

    for field in fields {
        let Some(value) = resolve(document, field) else {
            continue;
        };
        insert_path(&mut projected, field, value.clone());
    }

    projected
}

fn insert_path(target: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            target.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(target.get(head), Some(Bson::Document(_))) {
                target.insert(head, Document::new());
            }
            if let Ok(embedded) = target.get_document_mut(head) {
                insert_path(embedded, rest, value);
            }
        }
    }
}

#[async_trait]
impl FilterStore for InMemoryStore {
    type Filter = RowExpr;

    async fn find(&self, collection: &str, filter: &RowExpr, options: FindOptions) -> FilterResult<Vec<Bson>> {
        Ok(
            self.select(collection, filter, &options)
                .await
                .into_iter()
                .map(Bson::Document)
                .collect()
        )
    }

    async fn count(&self, collection: &str, filter: &RowExpr) -> FilterResult<u64> {
        let store = self.store.read().await;
        let count = store
            .get(collection)
            .map_or(0, |rows| RowEvaluator::filter_documents(rows, filter).len());

        Ok(count as u64)
    }

    async fn project(
        &self,
        collection: &str,
        filter: &RowExpr,
        fields: &[&str],
        options: FindOptions,
    ) -> FilterResult<Vec<Bson>> {
        Ok(
            self.select(collection, filter, &options)
                .await
                .iter()
                .map(|document| Bson::Document(project_fields(document, fields)))
                .collect()
        )
    }
}

/// Builder for [`InMemoryStore`] instances, optionally seeded with rows.
#[derive(Debug, Default)]
pub struct InMemoryStoreBuilder {
    collections: StoreMap,
}

impl InMemoryStoreBuilder {
    /// Adds rows to a collection of the store being built.
    pub fn collection(mut self, name: impl Into<String>, documents: impl IntoIterator<Item = Document>) -> Self {
        self.collections
            .entry(name.into())
            .or_default()
            .extend(documents);
        self
    }

    pub fn build(self) -> InMemoryStore {
        InMemoryStore {
            store: Arc::new(RwLock::new(self.collections)),
        }
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;
    use docfilter_core::query::FindOptions;

    use super::*;
    use crate::row::{any, element, row};

    fn store() -> InMemoryStore {
        InMemoryStore::builder()
            .collection("persons", vec![
                doc! { "name": "Alice", "age": 30, "tags": ["admin"], "address": { "city": "Leiden", "zip": "2311" } },
                doc! { "name": "Bob", "age": 17, "tags": [] },
                doc! { "name": "Carol", "age": 65, "tags": ["staff", "admin"] },
                doc! { "name": "Dave" },
            ])
            .build()
    }

    fn names(documents: Vec<Bson>) -> Vec<String> {
        documents
            .into_iter()
            .filter_map(|doc| doc.as_document()?.get_str("name").ok().map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn find_filters_in_insertion_order() {
        let found = store()
            .find("persons", &row("age").ge(18), FindOptions::new())
            .await
            .unwrap();
        assert_eq!(names(found), ["Alice", "Carol"]);
    }

    #[tokio::test]
    async fn find_sorts_and_pages() {
        let options = FindOptions::builder()
            .sort("age", SortDirection::Desc)
            .skip(1)
            .limit(2)
            .build();
        let found = store().find("persons", &RowExpr::Always, options).await.unwrap();
        assert_eq!(names(found), ["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn count_and_unknown_collection() {
        let store = store();
        assert_eq!(store.count("persons", &any("tags", element().eq("admin"))).await.unwrap(), 2);
        assert_eq!(store.count("persons", &RowExpr::Always).await.unwrap(), 4);
        assert_eq!(store.count("missing", &RowExpr::Always).await.unwrap(), 0);
        assert!(store.find("missing", &RowExpr::Always, FindOptions::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn project_keeps_named_fields() {
        let found = store()
            .project("persons", &row("name").eq("Alice"), &["name", "address.city"], FindOptions::new())
            .await
            .unwrap();
        assert_eq!(found, vec![Bson::Document(doc! { "name": "Alice", "address": { "city": "Leiden" } })]);
    }

    #[tokio::test]
    async fn insert_appends_rows() {
        let store = InMemoryStore::new();
        store.insert("persons", vec![doc! { "name": "Eve" }]).await;
        store.insert("persons", vec![doc! { "name": "Frank" }]).await;
        assert_eq!(store.count("persons", &RowExpr::Always).await.unwrap(), 2);
        assert_eq!(store.collections().await, ["persons"]);
    }
}
