//! Core data models shared by the chunker, the store, and the retriever.
//!
//! Offsets are character offsets (Unicode scalar values) into the
//! document's decoded text, half-open `[start, end)`.

use serde::Serialize;

use crate::embedding::decode_vector;
use crate::error::Result;

/// A span produced by the chunker, before embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// A chunk ready to be written: span plus its embedding vector.
#[derive(Debug, Clone)]
pub struct NewChunk {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A chunk as read back from a store during a full scan.
///
/// The embedding is kept in its serialized form; decoding happens in the
/// retriever so a single corrupt row can be skipped.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// Auto-incrementing chunk identifier.
    pub id: i64,
    /// Workspace-relative document path.
    pub path: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
    /// JSON array of floats.
    pub embedding_json: String,
}

impl ChunkRecord {
    /// Decode the stored embedding vector.
    pub fn embedding(&self) -> Result<Vec<f32>> {
        decode_vector(self.id, &self.embedding_json)
    }
}

/// Document and chunk counts for a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub documents: u64,
    pub chunks: u64,
    /// Largest recorded modification time, seconds since the Unix epoch.
    pub latest_mtime: Option<f64>,
}
