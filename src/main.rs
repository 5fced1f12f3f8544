use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use storefront::api::create_api_router;
use storefront::config::Config;
use storefront::entities::{primary_setup, setup_schema};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = storefront::connect(&config).await?;
    setup_schema(&db).await?;
    primary_setup(&db, config.admin.as_ref()).await?;

    let shared_db = Arc::new(db);
    let bind_addr = config.bind_addr.clone();
    let app = create_api_router(shared_db, Arc::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Running at {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
