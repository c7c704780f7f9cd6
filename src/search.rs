//! CLI entry points for indexing and retrieval.
//!
//! The ranking itself lives in `workspace_rag_core::retrieve`; this module
//! wires it to the configured database and formats the output.

use anyhow::Result;

use workspace_rag_core::retrieve::RetrievalResult;

use crate::config::Config;
use crate::indexer::IndexReport;
use crate::pipeline::Pipeline;

/// Run one indexing pass and print the report.
pub async fn run_index(config: &Config) -> Result<()> {
    let pipeline = Pipeline::open(config).await?;
    let report = pipeline.index().await;
    pipeline.close().await;

    print_report(&report?);
    println!("ok");
    Ok(())
}

/// Retrieve context for `query`, indexing first unless `skip_index` is set.
///
/// `limit` overrides `[retrieval].top_k`.
pub async fn search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    skip_index: bool,
) -> Result<RetrievalResult> {
    let mut config = config.clone();
    if let Some(k) = limit {
        config.retrieval.top_k = k;
    }

    let pipeline = Pipeline::open(&config).await?;
    let result = async {
        if !skip_index {
            pipeline.index().await?;
        }
        pipeline.retrieve(query).await
    }
    .await;
    pipeline.close().await;
    result
}

/// CLI entry point: calls [`search`] and prints the context block or JSON.
pub async fn run_search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    skip_index: bool,
    json: bool,
) -> Result<()> {
    let result = search(config, query, limit, skip_index).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", result.context_text);
    if !result.citations.is_empty() {
        println!();
        println!("citations:");
        for (i, c) in result.citations.iter().enumerate() {
            println!("  {}. {} [{}:{}] {:.3}", i + 1, c.path, c.start, c.end, c.score);
        }
    }
    Ok(())
}

fn print_report(report: &IndexReport) {
    println!("index");
    println!("  files scanned: {}", report.files_scanned);
    println!("  files indexed: {}", report.files_indexed);
    println!("  files unchanged: {}", report.files_unchanged);
    println!("  files failed: {}", report.files_failed);
    println!("  chunks written: {}", report.chunks_written);
    if report.documents_pruned > 0 {
        println!("  documents pruned: {}", report.documents_pruned);
    }
    println!("  duration: {} ms", report.duration_ms);
}
