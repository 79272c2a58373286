use mongodb::bson::{doc, Bson, Document};
use mongodb::error::Result as MongoResult;
use mongodb::options::{
    DeleteOptions, FindOneAndDeleteOptions, FindOneOptions, IndexOptions, InsertOneOptions,
    ReplaceOptions,
};
use mongodb::IndexModel;
use mongodb::{options::ClientOptions, Client};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::{config::AppConfig, constants::*};

#[cfg(test)]
use mockall::automock;

/// Counts reported by the server for a replace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub matched: u64,
    pub modified: u64,
    pub upserted: bool,
}

/// Shared handle to the MongoDB deployment
///
/// Opened once at startup with [`AppDatabase::new`] and released with
/// [`AppDatabase::close`] at shutdown.
pub struct AppDatabase {
    client: Client,
    db_name: String,
}

#[cfg_attr(test, automock)]
impl AppDatabase {
    pub async fn new(config: &AppConfig) -> MongoResult<Self> {
        let timeout = Duration::from_secs(MONGO_CONN_TIMEOUT);
        // create the mongodb client options
        let mut client_options = ClientOptions::parse(&config.mongodb_uri).await?;
        client_options.max_pool_size = Some(config.mongodb_max_pool);
        client_options.min_pool_size = Some(config.mongodb_min_pool);
        client_options.connect_timeout = Some(timeout);
        client_options.server_selection_timeout = Some(timeout);
        // create the client and verify that the deployment is reachable
        let client = Client::with_options(client_options)?;
        client
            .database("admin")
            .run_command(doc! {"ping": 1}, None)
            .await?;
        tracing::info!("Connected to MongoDB database: {}", config.db_name);
        let app_db = Self {
            client,
            db_name: config.db_name.to_owned(),
        };
        Ok(app_db)
    }

    pub async fn find_one<T>(
        &self,
        coll: &str,
        filter: Option<Document>,
        options: Option<FindOneOptions>,
    ) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync + 'static,
    {
        self.collection::<T>(coll).find_one(filter, options).await
    }

    /// Insert a document and return its `_id`
    pub async fn insert_one<T>(
        &self,
        coll: &str,
        doc: &T,
        options: Option<InsertOneOptions>,
    ) -> MongoResult<Bson>
    where
        T: Serialize + 'static,
    {
        let result = self.collection::<T>(coll).insert_one(doc, options).await?;
        Ok(result.inserted_id)
    }

    pub async fn replace_one<T>(
        &self,
        coll: &str,
        filter: Document,
        replacement: &T,
        options: Option<ReplaceOptions>,
    ) -> MongoResult<ReplaceSummary>
    where
        T: Serialize + 'static,
    {
        let result = self
            .collection::<T>(coll)
            .replace_one(filter, replacement, options)
            .await?;
        let summary = ReplaceSummary {
            matched: result.matched_count,
            modified: result.modified_count,
            upserted: result.upserted_id.is_some(),
        };
        Ok(summary)
    }

    pub async fn find_one_and_delete<T>(
        &self,
        coll: &str,
        filter: Document,
        options: Option<FindOneAndDeleteOptions>,
    ) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + 'static,
    {
        self.collection::<T>(coll)
            .find_one_and_delete(filter, options)
            .await
    }

    /// Delete every matching document and return how many were removed
    pub async fn delete_many(
        &self,
        coll: &str,
        filter: Document,
        options: Option<DeleteOptions>,
    ) -> MongoResult<u64> {
        let result = self
            .collection::<Document>(coll)
            .delete_many(filter, options)
            .await?;
        Ok(result.deleted_count)
    }

    pub async fn create_index(
        &self,
        coll: &str,
        keys: Document,
        options: IndexOptions,
    ) -> MongoResult<String> {
        let model = IndexModel::builder().keys(keys).options(options).build();
        let result = self
            .collection::<Document>(coll)
            .create_index(model, None)
            .await?;
        Ok(result.index_name)
    }

    /// Close all pooled connections
    pub async fn close(self) {
        self.client.shutdown().await;
        tracing::info!("MongoDB connection closed");
    }
}

impl AppDatabase {
    fn collection<T>(&self, coll: &str) -> mongodb::Collection<T> {
        self.client.database(&self.db_name).collection::<T>(coll)
    }
}
