use anyhow::Result;
use mongodb::{
    options::{ClientOptions, ResolverConfig},
    Client, Collection, Database,
};

use crate::utils::Config;

pub const USERS: &str = "users";
pub const CONNECTION_REQUESTS: &str = "connectionrequests";
pub const SESSIONS: &str = "sessions";

#[derive(Clone)]
pub struct DatabaseConnection {
    db: Database,
}

impl DatabaseConnection {
    pub async fn new(config: &Config) -> Result<Self> {
        // Create a ClientOptions instance and set the resolver config
        let options =
            ClientOptions::parse_with_resolver_config(&config.mongodb_uri, ResolverConfig::cloudflare())
                .await?;

        let client = Client::with_options(options)?;
        let db = client.database(&config.database_name);

        // Fail fast if the server is unreachable
        client
            .database("admin")
            .run_command(mongodb::bson::doc! { "ping": 1 }, None)
            .await?;

        tracing::info!(database = %config.database_name, "Connected to MongoDB");

        Ok(Self { db })
    }

    pub fn get_collection<T>(&self, collection_name: &str) -> Collection<T> {
        self.db.collection(collection_name)
    }
}
