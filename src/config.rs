//! TOML configuration parsing and validation.
//!
//! Only `[workspace].root` is required; every other setting falls back to
//! the defaults below. A relative `[workspace].root` is resolved against the
//! config file's directory. Relative paths in `[db].path` and `[index].roots`
//! are resolved against the workspace root.
//!
//! ```toml
//! [workspace]
//! root = "/path/to/repo"
//!
//! [db]
//! path = ".ai_state/ai_agents.sqlite3"
//!
//! [index]
//! roots = ["docs", "src", "frontend"]
//! include_extensions = [".md", ".cs", ".ts"]
//! exclude_dirs = [".git", "node_modules", "bin", "obj"]
//! max_file_bytes = 600000
//! prune_missing = false
//!
//! [chunking]
//! chunk_chars = 1800
//! overlap_chars = 250
//!
//! [embedding]
//! dims = 768
//!
//! [retrieval]
//! top_k = 10
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use workspace_rag_core::chunk::ChunkerConfig;
use workspace_rag_core::embedding::HashEmbedder;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".ai_state").join("ai_agents.sqlite3")
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,
    #[serde(default = "default_include_extensions")]
    pub include_extensions: Vec<String>,
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Delete stored documents whose file was not seen during a pass.
    #[serde(default)]
    pub prune_missing: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            include_extensions: default_include_extensions(),
            exclude_dirs: default_exclude_dirs(),
            max_file_bytes: default_max_file_bytes(),
            prune_missing: false,
        }
    }
}

fn default_roots() -> Vec<PathBuf> {
    ["docs", "src", "frontend"]
        .into_iter()
        .map(PathBuf::from)
        .collect()
}

fn default_include_extensions() -> Vec<String> {
    [
        ".md", ".txt", ".cs", ".csproj", ".sln", ".json", ".yml", ".yaml", ".ts", ".tsx", ".js",
        ".jsx",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_dirs() -> Vec<String> {
    // Build output and tool state would otherwise flood the index.
    [
        ".git",
        ".ai_state",
        "bin",
        "obj",
        "artifacts",
        "node_modules",
        "dist",
        "build",
        ".idea",
        ".vscode",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_file_bytes() -> u64 {
    600_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_chars: default_chunk_chars(),
            overlap_chars: default_overlap_chars(),
        }
    }
}

fn default_chunk_chars() -> usize {
    1800
}
fn default_overlap_chars() -> usize {
    250
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_dims")]
    pub dims: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dims: default_dims(),
        }
    }
}

fn default_dims() -> usize {
    768
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    10
}

impl Config {
    /// Default configuration for a workspace, without a config file.
    pub fn for_workspace(root: impl Into<PathBuf>) -> Self {
        Self {
            workspace: WorkspaceConfig { root: root.into() },
            db: DbConfig::default(),
            index: IndexConfig::default(),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }

    /// Database file, resolved against the workspace root.
    pub fn db_path(&self) -> PathBuf {
        self.workspace.root.join(&self.db.path)
    }

    /// Index roots, resolved against the workspace root.
    pub fn index_roots(&self) -> Vec<PathBuf> {
        self.index
            .roots
            .iter()
            .map(|r| self.workspace.root.join(r))
            .collect()
    }

    /// Allowed extensions, lowercased and without the leading dot.
    pub fn allowed_extensions(&self) -> HashSet<String> {
        self.index
            .include_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    pub fn excluded_dirs(&self) -> HashSet<String> {
        self.index.exclude_dirs.iter().cloned().collect()
    }

    pub fn chunker(&self) -> Result<ChunkerConfig> {
        Ok(ChunkerConfig::new(
            self.chunking.chunk_chars,
            self.chunking.overlap_chars,
        )?)
    }

    pub fn embedder(&self) -> Result<HashEmbedder> {
        Ok(HashEmbedder::new(self.embedding.dims)?)
    }

    /// Check every setting that would otherwise fail later at construction.
    pub fn validate(&self) -> Result<()> {
        if self.workspace.root.as_os_str().is_empty() {
            anyhow::bail!("workspace.root must not be empty");
        }
        if self.chunking.chunk_chars == 0 {
            anyhow::bail!("chunking.chunk_chars must be > 0");
        }
        if self.embedding.dims == 0 {
            anyhow::bail!("embedding.dims must be > 0");
        }
        if self.retrieval.top_k < 1 {
            anyhow::bail!("retrieval.top_k must be >= 1");
        }
        if self.allowed_extensions().is_empty() {
            anyhow::bail!("index.include_extensions must list at least one extension");
        }
        Ok(())
    }
}

/// Load and validate a config file.
///
/// A relative `[workspace].root` is resolved against the directory that
/// contains the config file, not the current directory.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    if config.workspace.root.is_relative() {
        if let Some(dir) = path.parent() {
            config.workspace.root = dir.join(&config.workspace.root);
        }
    }
    config.validate()?;

    Ok(config)
}
