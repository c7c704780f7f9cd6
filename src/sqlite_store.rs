//! SQLite-backed [`Store`] implementation.
//!
//! Maps each [`Store`] operation onto the `rag_docs` / `rag_chunks` schema
//! created by [`migrate`](crate::migrate). Embeddings are written as JSON
//! arrays so the database stays readable with the `sqlite3` shell.
//!
//! Writes are serialized through an async mutex and each upsert runs in a
//! single transaction; scans go straight to the pool and, with WAL, only
//! ever see committed chunk sets.

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use workspace_rag_core::embedding::encode_vector;
use workspace_rag_core::models::{ChunkRecord, NewChunk, StoreStats};
use workspace_rag_core::store::Store;

use crate::config::Config;
use crate::{db, migrate};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// Connect to the configured database, ensure the schema exists, and
    /// reconcile the stored embedding dimension with `[embedding].dims`.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::run_migrations(&pool).await?;
        let store = Self::new(pool);
        store.ensure_dims(config.embedding.dims).await?;
        Ok(store)
    }

    /// Record `dims` as the index's embedding dimension.
    ///
    /// Vectors of another length never score, so when the recorded value
    /// differs every document and chunk is deleted and the next indexing
    /// pass re-embeds the workspace. Returns `true` when the index was reset.
    pub async fn ensure_dims(&self, dims: usize) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let stored: Option<String> =
            sqlx::query_scalar("SELECT value FROM rag_meta WHERE key = 'embedding_dims'")
                .fetch_optional(&mut *tx)
                .await?;
        let wanted = dims.to_string();
        if stored.as_deref() == Some(wanted.as_str()) {
            return Ok(false);
        }

        let reset = stored.is_some();
        if reset {
            tracing::warn!(
                from = stored.as_deref().unwrap_or_default(),
                to = dims,
                "embedding dimension changed, clearing index"
            );
            sqlx::query("DELETE FROM rag_chunks").execute(&mut *tx).await?;
            sqlx::query("DELETE FROM rag_docs").execute(&mut *tx).await?;
        }
        sqlx::query(
            "INSERT INTO rag_meta (key, value) VALUES ('embedding_dims', ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(&wanted)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(reset)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_record(row: &SqliteRow) -> Result<ChunkRecord> {
    let start: i64 = row.try_get("start_char")?;
    let end: i64 = row.try_get("end_char")?;
    Ok(ChunkRecord {
        id: row.try_get("id")?,
        path: row.try_get("path")?,
        start: usize::try_from(start)?,
        end: usize::try_from(end)?,
        text: row.try_get("text")?,
        embedding_json: row.try_get("embedding_json")?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn needs_reindex(&self, path: &str, mtime: f64) -> Result<bool> {
        let stored: Option<f64> = sqlx::query_scalar("SELECT mtime FROM rag_docs WHERE path = ?")
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;

        Ok(stored.map_or(true, |m| m != mtime))
    }

    async fn upsert_document(&self, path: &str, mtime: f64, chunks: &[NewChunk]) -> Result<()> {
        let mut rows = Vec::with_capacity(chunks.len());
        for c in chunks {
            rows.push((
                i64::try_from(c.start)?,
                i64::try_from(c.end)?,
                encode_vector(&c.embedding)?,
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM rag_chunks WHERE path = ?")
            .bind(path)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO rag_docs (path, mtime) VALUES (?, ?)
            ON CONFLICT(path) DO UPDATE SET mtime = excluded.mtime
            "#,
        )
        .bind(path)
        .bind(mtime)
        .execute(&mut *tx)
        .await?;

        for (chunk, (start, end, embedding_json)) in chunks.iter().zip(rows) {
            sqlx::query(
                r#"
                INSERT INTO rag_chunks (path, mtime, start_char, end_char, text, embedding_json)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(path)
            .bind(mtime)
            .bind(start)
            .bind(end)
            .bind(&chunk.text)
            .bind(embedding_json)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_document(&self, path: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM rag_chunks WHERE path = ?")
            .bind(path)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM rag_docs WHERE path = ?")
            .bind(path)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    fn scan_chunks(&self) -> BoxStream<'_, Result<ChunkRecord>> {
        sqlx::query(
            "SELECT id, path, start_char, end_char, text, embedding_json FROM rag_chunks ORDER BY id",
        )
        .fetch(&self.pool)
        .map(|row| -> Result<ChunkRecord> { row_to_record(&row?) })
        .boxed()
    }

    async fn document_paths(&self) -> Result<Vec<String>> {
        let paths: Vec<String> = sqlx::query_scalar("SELECT path FROM rag_docs ORDER BY path")
            .fetch_all(&self.pool)
            .await?;
        Ok(paths)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM rag_docs) AS documents,
                (SELECT COUNT(*) FROM rag_chunks) AS chunks,
                (SELECT MAX(mtime) FROM rag_docs) AS latest_mtime
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let documents: i64 = row.try_get("documents")?;
        let chunks: i64 = row.try_get("chunks")?;
        Ok(StoreStats {
            documents: u64::try_from(documents)?,
            chunks: u64::try_from(chunks)?,
            latest_mtime: row.try_get("latest_mtime")?,
        })
    }
}
