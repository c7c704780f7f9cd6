//! Incremental workspace indexer: walk → filter → chunk → embed → store.
//!
//! One call to [`Indexer::index_workspace`] brings the store up to date with
//! the filesystem. A file is re-chunked only when its modification time
//! differs from the one recorded for its path, so a second pass over an
//! unchanged tree performs no writes.
//!
//! Indexing is best-effort: a file that cannot be stat'ed or read is
//! skipped and counted in [`IndexReport::files_failed`]; it never aborts the
//! pass, and pruning never deletes the stored document of a file that only
//! failed to stat or read. Store errors, on the other hand, are returned to
//! the caller.

use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, UNIX_EPOCH};
use walkdir::{DirEntry, WalkDir};

use workspace_rag_core::chunk::{chunk_text, ChunkerConfig};
use workspace_rag_core::embedding::HashEmbedder;
use workspace_rag_core::models::NewChunk;
use workspace_rag_core::store::Store;

use crate::config::Config;

/// Which files the indexer admits and where it looks for them.
#[derive(Debug, Clone)]
pub struct IndexerOptions {
    /// Relative paths stored in the index are computed against this root.
    pub workspace_root: PathBuf,
    pub roots: Vec<PathBuf>,
    /// Lowercase, without the leading dot.
    pub extensions: HashSet<String>,
    /// Directory names never descended into.
    pub exclude_dirs: HashSet<String>,
    pub max_file_bytes: u64,
    pub prune_missing: bool,
}

impl IndexerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            workspace_root: config.workspace.root.clone(),
            roots: config.index_roots(),
            extensions: config.allowed_extensions(),
            exclude_dirs: config.excluded_dirs(),
            max_file_bytes: config.index.max_file_bytes,
            prune_missing: config.index.prune_missing,
        }
    }
}

/// A file that passed every filter, with its change-detection key.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub rel_path: String,
    /// Seconds since the Unix epoch.
    pub mtime: f64,
}

/// Result of walking the index roots.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<CandidateFile>,
    /// Entries that could not be walked or stat'ed.
    pub failed: usize,
    /// Relative paths (files or whole directories) that failed this pass.
    pub unreadable: Vec<String>,
    /// False when a walk error could not be tied to a path.
    pub complete: bool,
}

impl ScanOutcome {
    /// Whether `path` is, or lies under, an entry that failed this pass.
    pub fn covers_unreadable(&self, path: &str) -> bool {
        let path = Path::new(path);
        self.unreadable.iter().any(|u| path.starts_with(u))
    }
}

/// Summary of an indexing pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IndexReport {
    /// Files admitted by the extension and size filters.
    pub files_scanned: usize,
    /// Files whose chunk set was (re)written.
    pub files_indexed: usize,
    pub files_unchanged: usize,
    /// Files skipped because of I/O errors.
    pub files_failed: usize,
    pub chunks_written: usize,
    pub documents_pruned: usize,
    pub duration_ms: u64,
}

/// Keeps a [`Store`] current with the files under the configured roots.
pub struct Indexer<S: Store + ?Sized> {
    store: Arc<S>,
    chunker: ChunkerConfig,
    embedder: HashEmbedder,
    options: IndexerOptions,
}

impl<S: Store + ?Sized> Indexer<S> {
    pub fn new(
        store: Arc<S>,
        chunker: ChunkerConfig,
        embedder: HashEmbedder,
        options: IndexerOptions,
    ) -> Self {
        Self {
            store,
            chunker,
            embedder,
            options,
        }
    }

    /// Build an indexer from configuration, validating chunking and embedding settings.
    pub fn from_config(store: Arc<S>, config: &Config) -> Result<Self> {
        Ok(Self::new(
            store,
            config.chunker()?,
            config.embedder()?,
            IndexerOptions::from_config(config),
        ))
    }

    /// Walk every root and collect the admitted files, in walk order.
    ///
    /// Entries that fail to stat or read during the walk are counted and
    /// remembered in [`ScanOutcome::unreadable`] rather than dropped.
    pub fn scan_files(&self) -> ScanOutcome {
        let mut scan = ScanOutcome {
            complete: true,
            ..ScanOutcome::default()
        };

        for root in &self.options.roots {
            if !root.exists() {
                tracing::debug!(root = %root.display(), "index root missing, skipping");
                continue;
            }

            let walker = WalkDir::new(root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !self.is_excluded_dir(e));

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::debug!("walk error: {e}");
                        scan.failed += 1;
                        match e.path() {
                            Some(path) => scan.unreadable.push(self.relative(path)),
                            None => scan.complete = false,
                        }
                        continue;
                    }
                };
                if entry.file_type().is_dir() || !self.has_allowed_extension(entry.path()) {
                    continue;
                }

                match self.admit(entry.path()) {
                    Ok(Some(file)) => scan.files.push(file),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::debug!(path = %entry.path().display(), "stat failed: {e}");
                        scan.failed += 1;
                        scan.unreadable.push(self.relative(entry.path()));
                    }
                }
            }
        }

        scan
    }

    /// Run one indexing pass.
    pub async fn index_workspace(&self) -> Result<IndexReport> {
        let started = Instant::now();
        let mut report = IndexReport::default();

        let scan = self.scan_files();
        report.files_scanned = scan.files.len();
        report.files_failed = scan.failed;
        tracing::info!(files = scan.files.len(), "indexing started");

        let mut seen: HashSet<String> = HashSet::with_capacity(scan.files.len());
        for file in &scan.files {
            seen.insert(file.rel_path.clone());

            if !self.store.needs_reindex(&file.rel_path, file.mtime).await? {
                report.files_unchanged += 1;
                continue;
            }

            let bytes = match std::fs::read(&file.path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::debug!(path = %file.rel_path, "read failed: {e}");
                    report.files_failed += 1;
                    continue;
                }
            };
            let text = String::from_utf8_lossy(&bytes);

            let chunks = self.embed_document(&text);
            self.store
                .upsert_document(&file.rel_path, file.mtime, &chunks)
                .await?;

            tracing::debug!(path = %file.rel_path, chunks = chunks.len(), "indexed");
            report.files_indexed += 1;
            report.chunks_written += chunks.len();
        }

        if self.options.prune_missing && !scan.complete {
            tracing::warn!("walk errors without a path, skipping prune");
        }
        if self.options.prune_missing && scan.complete {
            for path in self.store.document_paths().await? {
                if !seen.contains(&path) && !scan.covers_unreadable(&path) {
                    self.store.delete_document(&path).await?;
                    tracing::debug!(path = %path, "pruned");
                    report.documents_pruned += 1;
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        tracing::info!(
            indexed = report.files_indexed,
            unchanged = report.files_unchanged,
            failed = report.files_failed,
            pruned = report.documents_pruned,
            "indexing finished"
        );
        Ok(report)
    }

    /// Chunk `text` and embed every span.
    pub fn embed_document(&self, text: &str) -> Vec<NewChunk> {
        chunk_text(text, &self.chunker)
            .into_iter()
            .map(|span| NewChunk {
                embedding: self.embedder.embed(&span.text),
                start: span.start,
                end: span.end,
                text: span.text,
            })
            .collect()
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.options.exclude_dirs.contains(name))
    }

    fn has_allowed_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.options.extensions.contains(&e.to_lowercase()))
    }

    /// Workspace-relative path, or the full path for files outside the root.
    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.options.workspace_root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }

    /// Stat a file (following symlinks) and apply the regular-file and size filters.
    fn admit(&self, path: &Path) -> std::io::Result<Option<CandidateFile>> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() || metadata.len() > self.options.max_file_bytes {
            return Ok(None);
        }
        let mtime = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();

        Ok(Some(CandidateFile {
            path: path.to_path_buf(),
            rel_path: self.relative(path),
            mtime,
        }))
    }
}
