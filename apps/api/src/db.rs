use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// The lab table is only ever read, and at most a couple of queries run per request.
const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connects to the Postgres database holding the lab table and checks that `table` is readable.
pub async fn create_pool(database_url: &str, table: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .context("Failed to connect to the lab database")?;

    // `table` is a validated plain identifier.
    let count: i64 = sqlx::query_scalar(&format!(r#"SELECT COUNT(*) FROM "{table}""#))
        .fetch_one(&pool)
        .await
        .with_context(|| format!("Lab table '{table}' is not readable"))?;

    info!("PostgreSQL connection pool established ({count} labs in '{table}')");
    Ok(pool)
}
