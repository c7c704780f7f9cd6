//! In-memory [`Store`] implementation for tests.
//!
//! Documents live in a `HashMap` and chunks in an insertion-ordered `Vec`,
//! both behind one `std::sync::RwLock`. Embeddings are kept in the same
//! JSON form the SQLite store persists, so scans behave identically.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use crate::embedding::encode_vector;
use crate::models::{ChunkRecord, NewChunk, StoreStats};

use super::Store;

#[derive(Default)]
struct Tables {
    docs: HashMap<String, f64>,
    chunks: Vec<ChunkRecord>,
    next_id: i64,
}

/// In-memory store for tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chunk row verbatim, bypassing vector encoding.
    ///
    /// Lets tests plant rows with arbitrary (including corrupt) embeddings.
    pub fn insert_raw_chunk(
        &self,
        path: &str,
        start: usize,
        end: usize,
        text: &str,
        embedding_json: &str,
    ) -> Result<i64> {
        let mut t = self.tables.write().map_err(|_| anyhow!("store lock poisoned"))?;
        t.next_id += 1;
        let id = t.next_id;
        t.chunks.push(ChunkRecord {
            id,
            path: path.to_string(),
            start,
            end,
            text: text.to_string(),
            embedding_json: embedding_json.to_string(),
        });
        Ok(id)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn needs_reindex(&self, path: &str, mtime: f64) -> Result<bool> {
        let t = self.tables.read().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(t.docs.get(path).map_or(true, |stored| *stored != mtime))
    }

    async fn upsert_document(&self, path: &str, mtime: f64, chunks: &[NewChunk]) -> Result<()> {
        let encoded = chunks
            .iter()
            .map(|c| encode_vector(&c.embedding))
            .collect::<serde_json::Result<Vec<_>>>()?;

        let mut t = self.tables.write().map_err(|_| anyhow!("store lock poisoned"))?;
        t.chunks.retain(|c| c.path != path);
        t.docs.insert(path.to_string(), mtime);
        for (c, embedding_json) in chunks.iter().zip(encoded) {
            t.next_id += 1;
            let id = t.next_id;
            t.chunks.push(ChunkRecord {
                id,
                path: path.to_string(),
                start: c.start,
                end: c.end,
                text: c.text.clone(),
                embedding_json,
            });
        }
        Ok(())
    }

    async fn delete_document(&self, path: &str) -> Result<()> {
        let mut t = self.tables.write().map_err(|_| anyhow!("store lock poisoned"))?;
        t.chunks.retain(|c| c.path != path);
        t.docs.remove(path);
        Ok(())
    }

    fn scan_chunks(&self) -> BoxStream<'_, Result<ChunkRecord>> {
        // Snapshot under the read lock so the scan never observes a half-applied upsert.
        let snapshot = match self.tables.read() {
            Ok(t) => t.chunks.iter().cloned().map(Ok).collect::<Vec<_>>(),
            Err(_) => vec![Err(anyhow!("store lock poisoned"))],
        };
        stream::iter(snapshot).boxed()
    }

    async fn document_paths(&self) -> Result<Vec<String>> {
        let t = self.tables.read().map_err(|_| anyhow!("store lock poisoned"))?;
        let mut paths: Vec<String> = t.docs.keys().cloned().collect();
        paths.sort();
        Ok(paths)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let t = self.tables.read().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(StoreStats {
            documents: t.docs.len() as u64,
            chunks: t.chunks.len() as u64,
            latest_mtime: t.docs.values().copied().reduce(f64::max),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    fn chunk(start: usize, end: usize, text: &str) -> NewChunk {
        NewChunk {
            start,
            end,
            text: text.to_string(),
            embedding: vec![1.0, 0.0],
        }
    }

    #[tokio::test]
    async fn test_needs_reindex() {
        let store = InMemoryStore::new();
        assert!(store.needs_reindex("a.md", 1.0).await.unwrap());
        store.upsert_document("a.md", 1.0, &[]).await.unwrap();
        assert!(!store.needs_reindex("a.md", 1.0).await.unwrap());
        assert!(store.needs_reindex("a.md", 2.0).await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_replaces_chunks() {
        let store = InMemoryStore::new();
        store
            .upsert_document("a.md", 1.0, &[chunk(0, 3, "one"), chunk(2, 5, "two")])
            .await
            .unwrap();
        let first: Vec<ChunkRecord> = store.scan_chunks().try_collect().await.unwrap();
        assert_eq!(first.len(), 2);

        store
            .upsert_document("a.md", 2.0, &[chunk(0, 5, "three")])
            .await
            .unwrap();
        let second: Vec<ChunkRecord> = store.scan_chunks().try_collect().await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].text, "three");
        assert!(first.iter().all(|old| old.id != second[0].id));
    }

    #[tokio::test]
    async fn test_delete_document() {
        let store = InMemoryStore::new();
        store.upsert_document("a.md", 1.0, &[chunk(0, 1, "a")]).await.unwrap();
        store.upsert_document("b.md", 1.0, &[chunk(0, 1, "b")]).await.unwrap();
        store.delete_document("a.md").await.unwrap();

        assert_eq!(store.document_paths().await.unwrap(), vec!["b.md"]);
        let rows: Vec<ChunkRecord> = store.scan_chunks().try_collect().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path, "b.md");
    }

    #[tokio::test]
    async fn test_stats() {
        let store = InMemoryStore::new();
        assert_eq!(store.stats().await.unwrap(), StoreStats::default());
        store
            .upsert_document("a.md", 5.0, &[chunk(0, 1, "a"), chunk(1, 2, "b")])
            .await
            .unwrap();
        store.upsert_document("b.md", 9.0, &[]).await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.chunks, 2);
        assert_eq!(stats.latest_mtime, Some(9.0));
    }
}
