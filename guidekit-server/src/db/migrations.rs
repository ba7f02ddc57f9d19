//! Schema setup for the staging queue

use sqlx::PgPool;

/// Create the staging queue table and its indexes if missing
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running staging migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS staging_queue (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'approved', 'rejected')),
            reviewed_at TIMESTAMPTZ,
            raw_content JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_staging_queue_status ON staging_queue (status, created_at DESC)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Staging migrations complete");
    Ok(())
}
