//! Storage abstraction for workspace-rag.
//!
//! The [`Store`] trait is the single storage service shared by the indexer
//! (write path) and the retriever (read path). Both hold a reference to the
//! same instance instead of opening their own handles.
//!
//! Implementations must be `Send + Sync`. Writers are expected to be
//! serialized: implementations guard upserts and deletes with one write
//! lock, and scans read committed state.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::models::{ChunkRecord, NewChunk, StoreStats};

/// Persistent table of documents and their embedded chunks.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`needs_reindex`](Store::needs_reindex) | Change detection by modification time |
/// | [`upsert_document`](Store::upsert_document) | Replace a document's full chunk set |
/// | [`delete_document`](Store::delete_document) | Remove a document and its chunks |
/// | [`scan_chunks`](Store::scan_chunks) | Lazy full scan for similarity search |
/// | [`document_paths`](Store::document_paths) | All recorded document paths |
/// | [`stats`](Store::stats) | Document and chunk counts |
#[async_trait]
pub trait Store: Send + Sync {
    /// True when `path` has no record or its recorded mtime differs from `mtime`.
    async fn needs_reindex(&self, path: &str, mtime: f64) -> Result<bool>;

    /// Remove existing chunks for `path`, record `(path, mtime)`, and insert
    /// `chunks`, as one unit from the caller's point of view.
    async fn upsert_document(&self, path: &str, mtime: f64, chunks: &[NewChunk]) -> Result<()>;

    /// Remove the document record and all of its chunks.
    async fn delete_document(&self, path: &str) -> Result<()>;

    /// Stream every stored chunk in insertion order.
    ///
    /// Each call starts a fresh scan.
    fn scan_chunks(&self) -> BoxStream<'_, Result<ChunkRecord>>;

    /// Paths of every recorded document, sorted.
    async fn document_paths(&self) -> Result<Vec<String>>;

    async fn stats(&self) -> Result<StoreStats>;
}
