use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn trecfuse(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trecfuse"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("trecfuse binary should start")
}

fn write(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, body).expect("fixture should be written");
    path.display().to_string()
}

#[test]
fn fuses_runs_filters_and_writes_manifest() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let a = write(dir.path(), "a.run", "1 Q0 docX 1 9.0 tagA\n1 Q0 docY 2 5.0 tagA\n");
    let b = write(dir.path(), "b.run", "1\tQ0\tdocY\t1\t7.0\ttagB\n1\tQ0\tdocZ\t2\t3.0\ttagB\n");
    let qrels = write(dir.path(), "q.txt", "1 0 docZ 0\n1 0 docY 2\n");
    let output = dir.path().join("fused.run");
    let manifest = dir.path().join("manifest.json");

    let result = trecfuse(&[
        "--runs",
        &a,
        &b,
        "--output",
        output.to_str().expect("utf-8 path"),
        "--runtag",
        "hybrid",
        "--qrels",
        &qrels,
        "--manifest",
        manifest.to_str().expect("utf-8 path"),
    ]);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    let written = fs::read_to_string(&output).expect("fused run should exist");
    let docids: Vec<&str> = written
        .lines()
        .map(|line| line.split(' ').nth(2).expect("docid column"))
        .collect();
    assert_eq!(docids, vec!["docY", "docZ"]);
    assert!(written.lines().all(|line| line.ends_with(" hybrid")));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&manifest).expect("manifest should exist"))
            .expect("manifest should be json");
    assert_eq!(manifest["method"]["name"], "rrf");
    assert_eq!(manifest["method"]["rrf_k"], 60);
    assert_eq!(manifest["inputs"].as_array().map(Vec::len), Some(2));
    assert_eq!(manifest["output"]["record_count"], 2);
    assert_eq!(manifest["qrels"]["filter"], "retain");
}

#[test]
fn single_run_fusion_fails_without_output() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let a = write(dir.path(), "a.run", "1 Q0 docX 1 9.0 tagA\n");
    let output = dir.path().join("fused.run");

    let result = trecfuse(&["--runs", &a, "--output", output.to_str().expect("utf-8 path")]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("requires at least 2 runs"));
    assert!(!output.exists());
}

#[test]
fn malformed_run_reports_line_and_exits_non_zero() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let a = write(dir.path(), "a.run", "1 Q0 docX 1 9.0 tagA\n");
    let b = write(dir.path(), "b.run", "1 Q0 docY 1 7.0\n");
    let output = dir.path().join("fused.run");

    let result = trecfuse(&["--runs", &a, &b, "--output", output.to_str().expect("utf-8 path")]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("b.run:1"), "stderr: {stderr}");
    assert!(!output.exists());
}

#[test]
fn manifest_write_failure_removes_the_fused_run() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let a = write(dir.path(), "a.run", "1 Q0 docX 1 9.0 tagA\n");
    let b = write(dir.path(), "b.run", "1 Q0 docY 1 7.0 tagB\n");
    let blocker = write(dir.path(), "blocker", "not a directory\n");
    let output = dir.path().join("fused.run");
    let manifest = Path::new(&blocker).join("manifest.json");

    let result = trecfuse(&[
        "--runs",
        &a,
        &b,
        "--output",
        output.to_str().expect("utf-8 path"),
        "--manifest",
        manifest.to_str().expect("utf-8 path"),
    ]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("failed to write run manifest"), "stderr: {stderr}");
    assert!(!output.exists());
    assert!(!manifest.exists());
}

#[test]
fn filter_that_empties_the_run_fails_without_output() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let a = write(dir.path(), "a.run", "1 Q0 docX 1 9.0 tagA\n");
    let b = write(dir.path(), "b.run", "1 Q0 docY 1 7.0 tagB\n");
    let qrels = write(dir.path(), "q.txt", "1 0 unretrieved 1\n");
    let output = dir.path().join("fused.run");

    let result = trecfuse(&[
        "--runs",
        &a,
        &b,
        "--output",
        output.to_str().expect("utf-8 path"),
        "--qrels",
        &qrels,
        "--qrels-filter",
        "retain",
    ]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("refusing to write empty run"), "stderr: {stderr}");
    assert!(!output.exists());
}
