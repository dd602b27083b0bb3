use crate::domain::error::{AppError, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const SCHEMA: &str = include_str!("../../../resources/schema.sql");

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:");
    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse database URL: {e}")))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    if !in_memory {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
    }

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { max_connections.max(1) })
        .acquire_timeout(Duration::from_secs(5));
    if in_memory {
        // Each connection owns its own in-memory database; keep the one alive.
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect to database: {e}")))?;

    apply_schema(&pool).await?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {e}")))?;

    info!(database_url, "Database ready");
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA.split(';') {
        let stmt = statement.trim();
        if stmt.is_empty() {
            continue;
        }
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to apply schema statement: {e}")))?;
    }

    // Databases created before runs existed lack the comment's run link.
    ensure_column(
        pool,
        "test_comments",
        "run_id",
        "TEXT REFERENCES test_runs (id) ON DELETE CASCADE",
    )
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_test_comments_run ON test_comments (run_id, created_at)",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to index comments by run: {e}")))?;
    Ok(())
}

async fn ensure_column(pool: &SqlitePool, table: &str, column: &str, definition: &str) -> Result<()> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to inspect {table} schema: {e}")))?;

    for row in rows {
        let name: String = row
            .try_get("name")
            .map_err(|e| AppError::DatabaseError(format!("Failed to read {table} schema: {e}")))?;
        if name == column {
            return Ok(());
        }
    }

    sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to add {column} column to {table}: {e}"))
        })?;
    Ok(())
}
