use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Ensures the `candidates` table exists.
///
/// `session_id` carries a UNIQUE constraint so that persisting the same
/// session twice (abrupt exit, duplicate terminal trigger) upserts instead of
/// inserting a second row. Phone, email and location hold ciphertext — the
/// store adapter encrypts them before they reach this table.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS candidates (
            id UUID PRIMARY KEY,
            session_id UUID NOT NULL UNIQUE,
            name TEXT,
            phone TEXT,
            email TEXT,
            location TEXT,
            experience_years SMALLINT,
            desired_position TEXT,
            tech_stack TEXT[] NOT NULL DEFAULT '{}',
            assessment JSONB NOT NULL DEFAULT '[]',
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            completed_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Table 'candidates' is ready");
    Ok(())
}
