//! E2E tests for the analysis commands:
//! `tangle analyze`, `tangle groups`, `tangle partitions`.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

const LAYERED: &str = r#"{
    "proj/util/log.go": [],
    "proj/util/str.go": ["proj/util/log.go"],
    "proj/core/a.go": ["proj/core/b.go", "proj/util/str.go"],
    "proj/core/b.go": ["proj/core/c.go"],
    "proj/core/c.go": ["proj/core/a.go", "proj/util/log.go"],
    "proj/ui/view.go": ["proj/core/a.go"],
    "proj/ui/main.go": ["proj/ui/view.go", "proj/util/log.go"],
    "proj/tools/gen.go": []
}"#;

fn tangle_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tangle"));
    cmd.current_dir(dir);
    cmd.env("TANGLE_LOG", "error");
    cmd.env_remove("TANGLE_VIEW");
    cmd.env_remove("FORMAT");
    cmd
}

fn write_edges(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("edges.json");
    fs::write(&path, body).expect("write edges");
    path
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

// ---------------------------------------------------------------------------
// tangle analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_json_reports_headline_metrics() {
    let dir = TempDir::new().expect("tempdir");
    let edges = write_edges(dir.path(), LAYERED);

    let json = json_output(tangle_cmd(dir.path()).arg("analyze").arg(&edges).arg("--json"));

    assert_eq!(json["file_count"], 8);
    assert_eq!(json["core_count"], 3);
    assert_eq!(json["propagation_cost"], 0.5);
    assert_eq!(json["view"], "core-periphery");
    assert_eq!(json["threshold"]["fan_in"], 5);
    assert_eq!(json["threshold"]["fan_out"], 5);
    assert_eq!(json["cyclic_residue"], 5);

    let sizes: Vec<u64> = json["partitions"]
        .as_array()
        .expect("partitions array")
        .iter()
        .map(|p| p["file_count"].as_u64().expect("count"))
        .collect();
    assert_eq!(sizes, vec![2, 3, 1, 2]);
}

#[test]
fn analyze_reads_stdin() {
    let dir = TempDir::new().expect("tempdir");

    let json = json_output(
        tangle_cmd(dir.path())
            .args(["analyze", "-", "--json"])
            .write_stdin(LAYERED),
    );
    assert_eq!(json["file_count"], 8);
}

#[test]
fn analyze_text_output() {
    let dir = TempDir::new().expect("tempdir");
    let edges = write_edges(dir.path(), LAYERED);

    tangle_cmd(dir.path())
        .arg("analyze")
        .arg(&edges)
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("files\t8\n"))
        .stdout(predicate::str::contains("propagation_cost\t0.5000"));
}

#[test]
fn analyze_pretty_output() {
    let dir = TempDir::new().expect("tempdir");
    let edges = write_edges(dir.path(), LAYERED);

    tangle_cmd(dir.path())
        .arg("analyze")
        .arg(&edges)
        .args(["--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("core size:"))
        .stdout(predicate::str::contains("3 / 8"));
}

#[test]
fn empty_input_is_not_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let edges = write_edges(dir.path(), "{}");

    let json = json_output(tangle_cmd(dir.path()).arg("analyze").arg(&edges).arg("--json"));
    assert_eq!(json["file_count"], 0);
    assert_eq!(json["propagation_cost"], 0.0);
}

// ---------------------------------------------------------------------------
// tangle groups / partitions
// ---------------------------------------------------------------------------

#[test]
fn groups_cycles_only() {
    let dir = TempDir::new().expect("tempdir");
    let edges = write_edges(dir.path(), LAYERED);

    let json = json_output(
        tangle_cmd(dir.path())
            .arg("groups")
            .arg(&edges)
            .args(["--cycles-only", "--json"]),
    );
    let groups = json.as_array().expect("array of groups");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["quadrant"], "core");
    assert_eq!(groups[0]["rank"], 3);
    assert_eq!(
        groups[0]["files"],
        serde_json::json!(["core/a.go", "core/b.go", "core/c.go"])
    );
}

#[test]
fn partitions_json_is_full_report() {
    let dir = TempDir::new().expect("tempdir");
    let edges = write_edges(dir.path(), LAYERED);

    let json = json_output(tangle_cmd(dir.path()).arg("partitions").arg(&edges).arg("--json"));

    assert_eq!(json["common_prefix"], "proj");
    let kinds: Vec<&str> = json["partitions"]
        .as_array()
        .expect("partitions")
        .iter()
        .map(|p| p["kind"].as_str().expect("kind"))
        .collect();
    assert_eq!(kinds, vec!["shared", "core", "periphery", "control"]);

    let core = &json["partitions"][1];
    assert_eq!(core["lowest_index"], 2);
    assert_eq!(core["highest_index"], 4);
    assert_eq!(core["groups"][0]["files"][0]["display_id"], "core/a.go");
    assert_eq!(
        core["groups"][0]["files"][0]["depends_on"],
        serde_json::json!([0, 1, 2, 3, 4])
    );
}

#[test]
fn partitions_full_paths() {
    let dir = TempDir::new().expect("tempdir");
    let edges = write_edges(dir.path(), LAYERED);

    tangle_cmd(dir.path())
        .arg("partitions")
        .arg(&edges)
        .args(["--format", "text", "--full-paths"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\tproj/util/log.go\t"))
        .stdout(predicate::str::contains("\tutil/log.go\t").not());
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn dangling_reference_fails_with_code() {
    let dir = TempDir::new().expect("tempdir");
    let edges = write_edges(dir.path(), r#"{"a.go": ["ghost.go"]}"#);

    tangle_cmd(dir.path())
        .arg("analyze")
        .arg(&edges)
        .arg("--json")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("E2001"))
        .stderr(predicate::str::contains("ghost.go"));
}

#[test]
fn malformed_input_fails_with_code() {
    let dir = TempDir::new().expect("tempdir");
    let edges = write_edges(dir.path(), r#"{"a.go": "not-a-list"}"#);

    tangle_cmd(dir.path())
        .arg("analyze")
        .arg(&edges)
        .args(["--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1003]"));
}

#[test]
fn missing_input_file_fails() {
    let dir = TempDir::new().expect("tempdir");

    tangle_cmd(dir.path())
        .args(["analyze", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
