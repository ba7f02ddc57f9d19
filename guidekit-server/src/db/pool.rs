//! Postgres pool for the staging queue

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Review traffic is a handful of moderators.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Longest wait for a free connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect to the staging database with the default connection limit.
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/guidekit").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;

    tracing::info!(max_connections, "staging database pool ready");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Run with: DATABASE_URL=postgres://... cargo test -p guidekit-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_respects_connection_limit() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool_with_options(&url, 2).await.expect("pool creation failed");
        crate::db::migrations::run(&pool).await.expect("migrations failed");

        let (exists,): (bool,) = sqlx::query_as("SELECT to_regclass('staging_queue') IS NOT NULL")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert!(exists);
        assert!(pool.size() <= 2);
    }
}
