//! # workspace-rag
//!
//! **Local, model-free semantic retrieval over a workspace's files.**
//!
//! workspace-rag keeps a SQLite index of the text and code files under a
//! workspace current, and answers free-text queries with ranked chunks plus
//! citations, ready to ground a downstream question-answering step.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌────────────┐
//! │  Indexer    │──▶│ Chunk+Embed  │──▶│   SQLite   │
//! │ walk+filter │   │ (hash trick) │   │ docs+chunks│
//! └─────────────┘   └──────────────┘   └─────┬──────┘
//!                                            │ full scan
//!                                            ▼
//!                                      ┌────────────┐
//!                                      │ Retriever  │──▶ context + citations
//!                                      └────────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. The **indexer** ([`indexer`]) walks the configured roots, pruning
//!    excluded directories, and admits files by extension and size.
//! 2. Files whose modification time changed are split into overlapping
//!    character windows and embedded with the deterministic hashing-trick
//!    embedder from `workspace-rag-core`.
//! 3. The **SQLite store** ([`sqlite_store`]) replaces each changed
//!    document's chunk set in one transaction.
//! 4. The **retriever** embeds the query the same way, scores every stored
//!    chunk, and returns the top-K with a rendered context block.
//!
//! ## Quick Start
//!
//! ```bash
//! wrag --workspace . init
//! wrag --workspace . index
//! wrag --workspace . search "where is the JWT validated?"
//! wrag --workspace . stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Idempotent schema creation |
//! | [`sqlite_store`] | SQLite implementation of the `Store` trait |
//! | [`indexer`] | Incremental filesystem indexer |
//! | [`pipeline`] | Shared-store index-then-retrieve facade |
//! | [`search`] | `index` and `search` command output |
//! | [`stats`] | Index statistics |

pub mod config;
pub mod db;
pub mod indexer;
pub mod migrate;
pub mod pipeline;
pub mod search;
pub mod sqlite_store;
pub mod stats;

pub use workspace_rag_core::retrieve::{Citation, RetrievalHit, RetrievalResult, NO_CONTEXT};
pub use workspace_rag_core::store;
