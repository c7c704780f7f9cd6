use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn wrag_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("wrag");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(
        docs_dir.join("alpha.md"),
        "# Alpha Document\n\nThis is the alpha document about Rust programming.\n\nIt contains information about cargo and crates.",
    ).unwrap();
    fs::write(
        docs_dir.join("beta.md"),
        "# Beta Document\n\nThis document discusses Python and machine learning.\n\nDeep learning frameworks like PyTorch are covered.",
    ).unwrap();

    let src_dir = root.join("src");
    fs::create_dir_all(src_dir.join("node_modules")).unwrap();
    fs::write(
        src_dir.join("gamma.txt"),
        "Gamma plain text file.\n\nContains notes about deployment and infrastructure.\n\nKubernetes and Docker are mentioned here.",
    ).unwrap();
    fs::write(
        src_dir.join("node_modules").join("vendored.js"),
        "kubernetes docker deployment vendored copy",
    )
    .unwrap();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_content = format!(
        r#"[workspace]
root = "{}"

[db]
path = "data/wrag.sqlite"

[index]
roots = ["docs", "src"]

[chunking]
chunk_chars = 400
overlap_chars = 40

[retrieval]
top_k = 5
"#,
        root.display().to_string().replace('\\', "\\\\")
    );

    let config_path = config_dir.join("wrag.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_wrag(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = wrag_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run wrag binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_wrag(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data").join("wrag.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_wrag(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_wrag(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_index_reports_files() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_wrag(&config_path, &["index"]);
    assert!(success, "index failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("files indexed: 3"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_index_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    run_wrag(&config_path, &["index"]);
    let (stdout, _, success) = run_wrag(&config_path, &["index"]);
    assert!(success);
    assert!(stdout.contains("files indexed: 0"));
    assert!(stdout.contains("files unchanged: 3"));
}

#[test]
fn test_search_prints_context_and_citations() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_wrag(&config_path, &["search", "kubernetes docker deployment"]);
    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("=== "));
    assert!(stdout.contains("gamma.txt"));
    assert!(stdout.contains("citations:"));
    assert!(!stdout.contains("vendored"));
}

#[test]
fn test_search_json_output() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_wrag(
        &config_path,
        &["search", "rust cargo crates", "--limit", "1", "--json"],
    );
    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let hits = value["hits"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0]["path"].as_str().unwrap().ends_with("alpha.md"));
    assert_eq!(value["citations"].as_array().unwrap().len(), 1);
}

#[test]
fn test_search_no_index_on_empty_database() {
    let (_tmp, config_path) = setup_test_env();

    run_wrag(&config_path, &["init"]);
    let (stdout, _, success) = run_wrag(&config_path, &["search", "rust", "--no-index"]);
    assert!(success);
    assert!(stdout.contains("(no context retrieved)"));
    assert!(!stdout.contains("citations:"));
}

#[test]
fn test_stats_after_index() {
    let (_tmp, config_path) = setup_test_env();

    run_wrag(&config_path, &["index"]);
    let (stdout, stderr, success) = run_wrag(&config_path, &["stats"]);
    assert!(success, "stats failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Documents:   3"));
    assert!(stdout.contains("Chunks:"));
}

#[test]
fn test_workspace_flag_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("docs")).unwrap();
    fs::write(tmp.path().join("docs").join("readme.md"), "hello workspace").unwrap();

    let output = Command::new(wrag_binary())
        .arg("--workspace")
        .arg(tmp.path())
        .arg("index")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("files indexed: 1"));
    assert!(tmp
        .path()
        .join(".ai_state")
        .join("ai_agents.sqlite3")
        .exists());
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_wrag(&tmp.path().join("nope.toml"), &["index"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
