use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;

mod db;
mod handlers;
mod models;
mod services;
mod utils;

use handlers::{user_router, ServerState};
use services::MongoSocialService;
use utils::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    utils::init_logging();

    // Create database connection
    let db_connection = db::DatabaseConnection::new(&config).await?;

    let state = Arc::new(ServerState {
        store: MongoSocialService::new(db_connection),
    });

    let app = user_router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
