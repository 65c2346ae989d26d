use crate::constants::*;
use mongodb::bson::Document;
use mongodb::error::Result as MongoResult;
use mongodb::options::{
    FindOneAndUpdateOptions, FindOneOptions, IndexOptions, InsertOneOptions, UpdateOptions,
};
use mongodb::results::UpdateResult;
use mongodb::{options::ClientOptions, Client, IndexModel};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

pub struct AppDatabase(Client);

impl AppDatabase {
    pub async fn new() -> anyhow::Result<Self> {
        // get all database parameters from environment
        let uri = std::env::var("MONGODB_URI")
            .map_err(|_| anyhow::anyhow!("MONGODB_URI not found in .env file"))?;
        let min_pool = std::env::var("MONGODB_MIN_POOL_SIZE").unwrap_or_default();
        let max_pool = std::env::var("MONGODB_MAX_POOL_SIZE").unwrap_or_default();
        let min_pool = min_pool.parse::<u32>().unwrap_or(MONGO_MIN_POOL_SIZE);
        let max_pool = max_pool.parse::<u32>().unwrap_or(MONGO_MAX_POOL_SIZE);
        let timeout = Duration::from_secs(MONGO_CONN_TIMEOUT);
        // create the mongodb client options
        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.max_pool_size = Some(max_pool);
        client_options.min_pool_size = Some(min_pool);
        client_options.connect_timeout = Some(timeout);
        client_options.server_selection_timeout = Some(timeout);
        // create the client and return Result object
        let client = Client::with_options(client_options)?;
        let app_db = Self(client);
        Ok(app_db)
    }

    pub async fn find_one<T>(
        &self,
        db: &str,
        coll: &str,
        filter: Option<Document>,
        options: Option<FindOneOptions>,
    ) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync + 'static,
    {
        let coll = self.0.database(db).collection::<T>(coll);
        coll.find_one(filter, options).await
    }

    pub async fn insert_one<T>(
        &self,
        db: &str,
        coll: &str,
        doc: &T,
        options: Option<InsertOneOptions>,
    ) -> MongoResult<()>
    where
        T: Serialize,
    {
        let coll = self.0.database(db).collection::<T>(coll);
        coll.insert_one(doc, options).await?;
        Ok(())
    }

    pub async fn update_one(
        &self,
        db: &str,
        coll: &str,
        filter: Document,
        update: Document,
        options: Option<UpdateOptions>,
    ) -> MongoResult<UpdateResult> {
        let coll = self.0.database(db).collection::<Document>(coll);
        coll.update_one(filter, update, options).await
    }

    pub async fn find_one_and_update<T>(
        &self,
        db: &str,
        coll: &str,
        filter: Document,
        update: Document,
        options: Option<FindOneAndUpdateOptions>,
    ) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let coll = self.0.database(db).collection::<T>(coll);
        coll.find_one_and_update(filter, update, options).await
    }

    /// Create an index, a no-op when the same index already exists
    pub async fn create_index(
        &self,
        db: &str,
        coll: &str,
        keys: Document,
        name: &str,
        unique: bool,
    ) -> MongoResult<()> {
        let coll = self.0.database(db).collection::<Document>(coll);
        let options = IndexOptions::builder()
            .name(Some(name.to_owned()))
            .unique(Some(unique))
            .build();
        let model = IndexModel::builder().keys(keys).options(options).build();
        coll.create_index(model, None).await?;
        Ok(())
    }
}
