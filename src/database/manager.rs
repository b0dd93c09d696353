use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::repository::RepositoryError;
use crate::config::DatabaseConfig;

/// Open the Postgres pool described by `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, RepositoryError> {
    let raw = config
        .url
        .as_deref()
        .ok_or_else(|| RepositoryError::Connection("DATABASE_URL is not set".to_string()))?;

    let url = url::Url::parse(raw).map_err(|_| RepositoryError::Connection("Invalid database URL".to_string()))?;
    if !matches!(url.scheme(), "postgres" | "postgresql") {
        return Err(RepositoryError::Connection(format!(
            "Unsupported database scheme: {}",
            url.scheme()
        )));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(url.as_str())
        .await?;

    info!("Created database pool for: {}{}", url.host_str().unwrap_or("localhost"), url.path());
    Ok(pool)
}
