use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates a PostgreSQL connection pool and makes sure the schema exists.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    migrate(&pool).await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Idempotent schema setup for checkpoints and saved jobs.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workflow_checkpoints (
            checkpoint_id UUID PRIMARY KEY,
            thread_id TEXT NOT NULL,
            seq BIGINT NOT NULL,
            graph TEXT NOT NULL,
            node TEXT NOT NULL,
            next_node TEXT,
            state JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (thread_id, seq)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create workflow_checkpoints")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS saved_jobs (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            company TEXT NOT NULL,
            listing JSONB NOT NULL,
            date_saved TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create saved_jobs")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_saved_jobs_title_company ON saved_jobs(title, company)",
    )
    .execute(pool)
    .await?;

    info!("Database migrations completed");
    Ok(())
}
