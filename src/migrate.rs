use anyhow::Result;
use sqlx::SqlitePool;

/// Create the document, chunk and metadata tables. Safe to run repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // One row per indexed file, keyed by workspace-relative path
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rag_docs (
            path TEXT PRIMARY KEY,
            mtime REAL NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Chunk rows; ids only ever grow, so a reindex never reuses one
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rag_chunks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            path TEXT NOT NULL,
            mtime REAL NOT NULL,
            start_char INTEGER NOT NULL,
            end_char INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding_json TEXT NOT NULL,
            FOREIGN KEY (path) REFERENCES rag_docs(path)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_rag_chunks_path ON rag_chunks(path)")
        .execute(pool)
        .await?;

    // Index-wide settings that every stored vector depends on (embedding dims)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rag_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
