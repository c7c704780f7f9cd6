//! Error types for workspace-rag-core.

/// Errors raised by the chunker, the embedder, and stored-vector decoding.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A chunking or embedding parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A stored embedding could not be decoded.
    #[error("corrupt embedding for chunk {chunk_id}: {source}")]
    CorruptEmbedding {
        chunk_id: i64,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;
