//! CLI integration tests
//!
//! Run the `facet` binary against the storefront fixture migrations with a
//! scratch database.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the compiled facet binary (resolved at compile time)
fn facet_bin() -> String {
    env!("CARGO_BIN_EXE_facet").to_string()
}

fn fixture_migrations() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/storefront/migrations")
}

/// Scratch directory with a facet.yml pointing at the fixture migrations.
struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let migrations = fixture_migrations();
        let config = format!(
            "database:\n  path: storefront.duckdb\nmigrations:\n  dir: {}\n  rollback_dir: {}\n",
            migrations.display(),
            migrations.join("rollback").display()
        );
        std::fs::write(dir.path().join("facet.yml"), config).unwrap();
        Self { dir }
    }

    fn facet(&self, args: &[&str]) -> Output {
        let config = self.dir.path().join("facet.yml");
        Command::new(facet_bin())
            .arg("--config")
            .arg(&config)
            .args(args)
            .env_remove("FACET_DATABASE")
            .output()
            .expect("Failed to run facet")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "facet failed.\nstdout: {}\nstderr: {}",
        stdout(output),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_migrate_then_status_json() {
    let project = Project::new();
    let output = project.facet(&["migrate"]);
    assert_success(&output);
    assert!(stdout(&output).contains("+ 20240105120000_create_products"));

    let output = project.facet(&["status", "--json"]);
    assert_success(&output);
    let entries: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let states: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["state"].as_str().unwrap())
        .collect();
    assert_eq!(states, vec!["applied", "applied", "applied"]);
}

#[test]
fn test_second_migrate_skips_everything() {
    let project = Project::new();
    assert_success(&project.facet(&["migrate"]));

    let output = project.facet(&["migrate", "--json"]);
    assert_success(&output);
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let outcomes: Vec<&str> = report["units"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["outcome"].as_str().unwrap())
        .collect();
    assert_eq!(outcomes, vec!["skipped", "skipped", "skipped"]);
}

#[test]
fn test_rollback_latest_marks_it_pending() {
    let project = Project::new();
    assert_success(&project.facet(&["migrate"]));
    assert_success(&project.facet(&["rollback", "20240202153000_add_ring_sizes"]));

    let output = project.facet(&["status"]);
    assert_success(&output);
    let text = stdout(&output);
    assert!(text.contains("1 pending"), "got: {text}");

    // Reapplying works because the rollback dropped the table.
    let output = project.facet(&["migrate"]);
    assert_success(&output);
    assert!(stdout(&output).contains("+ 20240202153000_add_ring_sizes"));
}

#[test]
fn test_missing_config_file_fails() {
    let output = Command::new(facet_bin())
        .args(["--config", "/nonexistent/facet.yml", "status"])
        .output()
        .expect("Failed to run facet");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("C001"));
}
