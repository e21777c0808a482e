use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};

use crate::config::StoreConfig;
use crate::models::UserDocument;

// ============================================================================
// MongoDB Session
// ============================================================================
//
// Owns the client and database handle for as long as the caller holds it.
// Stores borrow a collection from it; closing the session is explicit.
//
// ============================================================================

pub struct MongoSession {
    client: Client,
    database: Database,
    collection_name: String,
}

impl MongoSession {
    /// Connect and verify the deployment answers a ping
    pub async fn connect(config: &StoreConfig) -> Result<Self, mongodb::error::Error> {
        tracing::info!(uri = %config.uri, database = %config.database, "Connecting to MongoDB...");

        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some("mongo_cruds".to_string());
        options.server_selection_timeout = Some(config.operation_timeout);
        options.connect_timeout = Some(config.operation_timeout);

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);

        database.run_command(doc! { "ping": 1 }).await?;

        tracing::info!(database = %config.database, "✅ Connected to MongoDB");

        Ok(Self {
            client,
            database,
            collection_name: config.collection.clone(),
        })
    }

    /// Collection holding user records
    pub fn users(&self) -> Collection<UserDocument> {
        self.database.collection(&self.collection_name)
    }

    /// Remove every collection in the session's database
    pub async fn drop_database(&self) -> Result<(), mongodb::error::Error> {
        tracing::warn!(database = %self.database.name(), "Dropping database");
        self.database.drop().await
    }

    /// Release the connection pool
    pub async fn close(self) {
        let Self { client, database, .. } = self;
        drop(database);
        client.shutdown().await;
        tracing::info!("MongoDB session closed");
    }
}
