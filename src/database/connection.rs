use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::errors::{AppError, Result};

pub async fn get_db_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(|e| AppError::store(format!("failed to connect to Postgres: {}", e)))?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    tracing::info!("✅ Connected to Postgres");

    Ok(pool)
}
