use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the event table and its retention index if they do not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event_records (
            id                  UUID PRIMARY KEY,
            category            TEXT NOT NULL,
            event_type          TEXT NOT NULL,
            sentiment           TEXT NOT NULL,
            title               TEXT NOT NULL,
            event_description   TEXT,
            probability_of_yes  TEXT,
            probability_of_no   TEXT,
            created_date        TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_event_records_created_date ON event_records (created_date)",
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}
