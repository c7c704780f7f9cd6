//! Full-scan similarity retrieval.
//!
//! The retriever operates entirely through the [`Store`] trait. It embeds
//! the query with the same [`HashEmbedder`] used at index time and scores
//! every stored chunk.
//!
//! # Ranking Algorithm
//!
//! 1. Embed the query.
//! 2. Stream every chunk from the store; skip rows whose embedding fails
//!    to decode.
//! 3. Score each chunk by dot product with the query vector.
//! 4. Drop scores `<= 0` (no shared signal).
//! 5. Stable sort by score descending, so ties keep scan order.
//! 6. Truncate to `top_k`.
//! 7. Render the context block and the citation list.

use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::Result;
use futures::TryStreamExt;
use serde::Serialize;

use crate::embedding::{similarity, HashEmbedder};
use crate::store::Store;

/// Context text returned when no chunk scores above zero.
pub const NO_CONTEXT: &str = "(no context retrieved)";

/// A ranked chunk produced by a query. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalHit {
    pub path: String,
    pub start: usize,
    pub end: usize,
    pub score: f32,
    pub text: String,
}

/// Source reference backing a hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub path: String,
    pub start: usize,
    pub end: usize,
    pub score: f32,
}

impl From<&RetrievalHit> for Citation {
    fn from(hit: &RetrievalHit) -> Self {
        Self {
            path: hit.path.clone(),
            start: hit.start,
            end: hit.end,
            score: hit.score,
        }
    }
}

/// Output of one query: ranked hits, rendered context, and citations.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalResult {
    pub hits: Vec<RetrievalHit>,
    /// Labeled sections joined by blank lines, or [`NO_CONTEXT`].
    pub context_text: String,
    pub citations: Vec<Citation>,
}

impl RetrievalResult {
    /// Build the context block and citations for already-ranked hits.
    pub fn from_hits(hits: Vec<RetrievalHit>) -> Self {
        let context_text = if hits.is_empty() {
            NO_CONTEXT.to_string()
        } else {
            hits.iter()
                .map(render_hit)
                .collect::<Vec<_>>()
                .join("\n\n")
        };
        let citations = hits.iter().map(Citation::from).collect();
        Self {
            hits,
            context_text,
            citations,
        }
    }

    /// True when nothing cleared the positivity threshold.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

fn render_hit(hit: &RetrievalHit) -> String {
    format!(
        "=== {} [{}:{}] score={:.3} ===\n{}",
        hit.path, hit.start, hit.end, hit.score, hit.text
    )
}

/// Keep positive scores, stable-sort descending, truncate to `k`.
pub fn rank_hits(mut hits: Vec<RetrievalHit>, k: usize) -> Vec<RetrievalHit> {
    hits.retain(|h| h.score > 0.0);
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    hits.truncate(k);
    hits
}

/// Ranks stored chunks against free-text queries.
pub struct Retriever<S: Store + ?Sized> {
    store: Arc<S>,
    embedder: HashEmbedder,
    top_k: usize,
}

impl<S: Store + ?Sized> Retriever<S> {
    pub fn new(store: Arc<S>, embedder: HashEmbedder, top_k: usize) -> Self {
        Self {
            store,
            embedder,
            top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Return the `top_k` chunks most similar to `query`.
    ///
    /// Store errors propagate; corrupt embedding rows are skipped.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResult> {
        let query_vec = self.embedder.embed(query);
        self.retrieve_by_vector(&query_vec).await
    }

    /// Rank stored chunks against a precomputed query vector.
    pub async fn retrieve_by_vector(&self, query_vec: &[f32]) -> Result<RetrievalResult> {
        let mut scored = Vec::new();
        let mut skipped = 0usize;

        let mut rows = self.store.scan_chunks();
        while let Some(row) = rows.try_next().await? {
            let embedding = match row.embedding() {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(path = %row.path, "skipping chunk: {e}");
                    skipped += 1;
                    continue;
                }
            };
            let score = similarity(query_vec, &embedding);
            if score <= 0.0 {
                continue;
            }
            scored.push(RetrievalHit {
                path: row.path,
                start: row.start,
                end: row.end,
                score,
                text: row.text,
            });
        }

        let candidates = scored.len();
        let hits = rank_hits(scored, self.top_k);
        tracing::debug!(candidates, skipped, returned = hits.len(), "retrieval finished");
        Ok(RetrievalResult::from_hits(hits))
    }
}
