//! Index-then-retrieve orchestration over one shared store.
//!
//! [`Pipeline`] owns a single [`SqliteStore`] behind an `Arc` and hands the
//! same instance to both the [`Indexer`] and the [`Retriever`], so the write
//! path and the read path never hold independent connections.

use anyhow::Result;
use std::sync::Arc;

use workspace_rag_core::retrieve::{RetrievalResult, Retriever};

use crate::config::Config;
use crate::indexer::{IndexReport, Indexer};
use crate::sqlite_store::SqliteStore;

pub struct Pipeline {
    store: Arc<SqliteStore>,
    indexer: Indexer<SqliteStore>,
    retriever: Retriever<SqliteStore>,
}

impl Pipeline {
    /// Open the configured database (running migrations) and build both paths.
    ///
    /// Invalid chunking or embedding settings fail here.
    pub async fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(SqliteStore::open(config).await?);
        let indexer = Indexer::from_config(store.clone(), config)?;
        let retriever = Retriever::new(store.clone(), config.embedder()?, config.retrieval.top_k);
        Ok(Self {
            store,
            indexer,
            retriever,
        })
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    pub async fn index(&self) -> Result<IndexReport> {
        self.indexer.index_workspace().await
    }

    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResult> {
        self.retriever.retrieve(query).await
    }

    /// Bring the index up to date, then answer `query` from it.
    pub async fn index_and_retrieve(&self, query: &str) -> Result<(IndexReport, RetrievalResult)> {
        let report = self.index().await?;
        let result = self.retrieve(query).await?;
        Ok((report, result))
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}
