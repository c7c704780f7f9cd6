//! Index statistics.
//!
//! Provides a quick summary of what's indexed: document and chunk counts,
//! database size, and the newest recorded modification time. Used by
//! `wrag stats` to confirm that indexing passes are landing.

use anyhow::Result;

use workspace_rag_core::store::Store;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let stats = store.stats().await;
    store.close().await;
    let stats = stats?;

    let db_path = config.db_path();
    let db_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    println!("workspace-rag: index stats");
    println!("==========================");
    println!();
    println!("  Workspace:   {}", config.workspace.root.display());
    println!("  Database:    {}", db_path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Documents:   {}", stats.documents);
    println!("  Chunks:      {}", stats.chunks);
    println!("  Dimensions:  {}", config.embedding.dims);
    println!(
        "  Newest file: {}",
        stats
            .latest_mtime
            .map(format_mtime)
            .unwrap_or_else(|| "never".to_string())
    );
    println!();

    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

fn format_mtime(mtime: f64) -> String {
    let secs = mtime.floor() as i64;
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| mtime.to_string())
}
