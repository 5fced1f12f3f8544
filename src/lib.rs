pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod services;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::Config;

/// Opens the shared connection pool.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.database_max_connections)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    Database::connect(options).await
}
