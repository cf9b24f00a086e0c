use anyhow::Result;
use std::env;

pub const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub database_name: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        Ok(Self {
            mongodb_uri: env::var("MONGODB_URI")
                .map_err(|_| anyhow::anyhow!("MONGODB_URI must be set"))?,
            database_name: env::var("DATABASE_NAME")
                .map_err(|_| anyhow::anyhow!("DATABASE_NAME must be set"))?,
            port: parse_port(env::var("PORT").ok().as_deref()),
        })
    }
}

fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|p| p.trim().parse().ok())
        .unwrap_or(DEFAULT_SERVER_PORT)
}
