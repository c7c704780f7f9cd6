//! # workspace-rag core
//!
//! Pure retrieval logic for workspace-rag: character-window chunking, the
//! hashing-trick embedder, the [`store::Store`] abstraction, and the
//! full-scan similarity retriever.
//!
//! This crate contains no sqlx, tokio runtime, or filesystem I/O. The
//! SQLite store and the filesystem indexer live in the `workspace-rag`
//! application crate.

pub mod chunk;
pub mod embedding;
pub mod error;
pub mod models;
pub mod retrieve;
pub mod store;

pub use error::{CoreError, Result};
