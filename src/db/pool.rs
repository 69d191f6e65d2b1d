use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Create the PostgreSQL connection pool shared by every request handler.
///
/// The pool is the only shared mutable resource in the process; all durable
/// state lives behind it.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(16)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool ready");

    Ok(pool)
}
