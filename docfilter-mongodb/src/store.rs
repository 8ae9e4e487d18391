use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Bson, Document, doc};
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions as MongoFindOptions},
};
use docfilter_core::{
    backend::FilterStore,
    error::{FilterError, FilterResult},
    query::FindOptions,
};


/// Runs compiled query documents against a MongoDB database.
#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn find_options(options: &FindOptions) -> MongoFindOptions {
        let mut find_options = MongoFindOptions::default();

        if let Some(limit) = options.limit {
            find_options.limit = Some(limit as i64);
        }
        if let Some(skip) = options.skip {
            find_options.skip = Some(skip);
        }
        if let Some(sort) = &options.sort {
            find_options.sort = Some(doc! {
                sort.field.clone(): sort.direction.as_i32()
            });
        }

        find_options
    }

    /// Includes `fields` and excludes `_id` unless it is one of them.
    fn projection(fields: &[&str]) -> Document {
        let mut projection = Document::from_iter(
            fields
                .iter()
                .map(|field| (field.to_string(), Bson::Int32(1)))
        );
        if !fields.contains(&"_id") {
            projection.insert("_id", 0);
        }

        projection
    }

    async fn run_find(&self, collection: &str, filter: &Document, options: MongoFindOptions) -> FilterResult<Vec<Bson>> {
        Ok(
            self.get_collection(collection)
                .find(filter.clone())
                .with_options(options)
                .await
                .map_err(|e| FilterError::Backend(e.to_string()))?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(|e| FilterError::Backend(e.to_string()))?
                .into_iter()
                .map(Bson::Document)
                .collect()
        )
    }

    pub async fn shutdown(self) -> FilterResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

#[async_trait]
impl FilterStore for MongoDbStore {
    type Filter = Document;

    async fn find(&self, collection: &str, filter: &Document, options: FindOptions) -> FilterResult<Vec<Bson>> {
        self.run_find(collection, filter, Self::find_options(&options))
            .await
    }

    async fn count(&self, collection: &str, filter: &Document) -> FilterResult<u64> {
        self.get_collection(collection)
            .count_documents(filter.clone())
            .await
            .map_err(|e| FilterError::Backend(e.to_string()))
    }

    async fn project(
        &self,
        collection: &str,
        filter: &Document,
        fields: &[&str],
        options: FindOptions,
    ) -> FilterResult<Vec<Bson>> {
        let mut find_options = Self::find_options(&options);
        find_options.projection = Some(Self::projection(fields));

        self.run_find(collection, filter, find_options)
            .await
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }

    /// Connects the client. The driver connects lazily, so an unreachable server
    /// only surfaces on the first query.
    pub async fn build(self) -> FilterResult<MongoDbStore> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| FilterError::Backend(e.to_string()))?,
            )
            .map_err(|e| FilterError::Backend(e.to_string()))?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfilter_core::query::SortDirection;

    #[test]
    fn find_options_map_skip_limit_and_sort() {
        let options = FindOptions::builder()
            .skip(20)
            .limit(10)
            .sort("age", SortDirection::Desc)
            .build();
        let mapped = MongoDbStore::find_options(&options);

        assert_eq!(mapped.skip, Some(20));
        assert_eq!(mapped.limit, Some(10));
        assert_eq!(mapped.sort, Some(doc! { "age": -1 }));
        assert_eq!(mapped.projection, None);
    }

    #[test]
    fn default_find_options_leave_the_driver_defaults() {
        let mapped = MongoDbStore::find_options(&FindOptions::new());

        assert_eq!(mapped.skip, None);
        assert_eq!(mapped.limit, None);
        assert_eq!(mapped.sort, None);
    }

    #[test]
    fn projection_excludes_id_unless_requested() {
        assert_eq!(
            MongoDbStore::projection(&["lastname", "address.city"]),
            doc! { "lastname": 1, "address.city": 1, "_id": 0 }
        );
        assert_eq!(
            MongoDbStore::projection(&["_id", "lastname"]),
            doc! { "_id": 1, "lastname": 1 }
        );
    }
}
