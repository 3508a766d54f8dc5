//! CLI integration tests
//!
//! These tests verify that the CLI works correctly with various options.
//! Every run reads its packages from a snapshot file so no interpreter is
//! needed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
  "packages": [
    { "name": "Flask", "version": "3.0.2", "dependencies": ["Werkzeug>=3.0.0", "click>=8.1.3", "blinker", "asgiref; extra == \"async\""] },
    { "name": "Werkzeug", "version": "3.0.1", "dependencies": ["MarkupSafe>=2.1.1"] },
    { "name": "MarkupSafe", "version": "2.1.5" },
    { "name": "click", "version": "8.1.7" },
    { "name": "blinker", "version": "1.7.0" },
    { "name": "black", "version": "24.3.0", "dependencies": ["click>=8.0.0"] },
    { "name": "pytest-flask", "version": "1.3.0", "dependencies": ["Flask"] },
    { "name": "pip", "version": "24.0" }
  ]
}"#;

/// Temp workspace holding the snapshot; also used as the working directory
/// so no stray config file is picked up
fn workspace() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let snapshot = temp.path().join("env.json");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();
    (temp, snapshot)
}

fn pip_remove(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pip-remove").unwrap();
    cmd.current_dir(dir).env("NO_COLOR", "1");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    let (temp, _) = workspace();
    pip_remove(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--yes"))
        .stdout(predicate::str::contains("PACKAGE"));
}

#[test]
fn test_version() {
    let (temp, _) = workspace();
    pip_remove(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_package_is_required() {
    let (temp, _) = workspace();
    pip_remove(temp.path()).assert().failure();
}

// ============================================================================
// Resolution Output
// ============================================================================

#[test]
fn test_dry_run_lists_sections() {
    let (temp, snapshot) = workspace();
    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .args(["--dry-run", "flask"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "The following packages use Flask as a dependency:",
        ))
        .stdout(predicate::str::contains("  - pytest-flask"))
        .stdout(predicate::str::contains("  - asgiref --> a dependency of Flask"))
        .stdout(predicate::str::contains(
            "  - click (a dependency of Flask) --> used by black",
        ))
        .stdout(predicate::str::contains("The following dependencies will be REMOVED:"))
        .stdout(predicate::str::contains("  - MarkupSafe (a dependency of Werkzeug)"))
        .stdout(predicate::str::contains("Dry run - would uninstall:"))
        .stdout(predicate::str::contains("Total: 4 packages would be uninstalled"));
}

#[test]
fn test_nothing_to_remove() {
    let (temp, snapshot) = workspace();
    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .arg("black")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to remove for black."));
}

#[test]
fn test_no_extras_flag() {
    let (temp, snapshot) = workspace();
    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .args(["--no-extras", "--dry-run", "flask"])
        .assert()
        .success()
        .stdout(predicate::str::contains("asgiref").not());
}

#[test]
fn test_protect_flag() {
    let (temp, snapshot) = workspace();
    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .args(["--protect", "blinker", "--dry-run", "flask"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The following dependencies are whitelisted:"))
        .stdout(predicate::str::contains("  - blinker (a dependency of Flask)"))
        .stdout(predicate::str::contains("Total: 3 packages would be uninstalled"));
}

#[test]
fn test_config_file_protects_packages() {
    let (temp, snapshot) = workspace();
    std::fs::write(
        temp.path().join(".pip-remove.yml"),
        "protected:\n  - pip\n  - Werkzeug\n",
    )
    .unwrap();

    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .args(["--dry-run", "flask"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  - Werkzeug (a dependency of Flask)"))
        .stdout(predicate::str::contains("MarkupSafe").not());
}

#[test]
fn test_json_output() {
    let (temp, snapshot) = workspace();
    let output = pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .args(["--format", "json", "flask", "black"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["target"], "Flask");
    assert_eq!(results[0]["removable"], true);
    assert_eq!(
        results[0]["uninstall"],
        serde_json::json!(["Flask", "MarkupSafe", "Werkzeug", "blinker"])
    );
    assert_eq!(results[0]["required_by"], serde_json::json!(["pytest-flask"]));

    assert_eq!(results[1]["target"], "black");
    assert_eq!(results[1]["removable"], false);
}

#[test]
fn test_json_output_file() {
    let (temp, snapshot) = workspace();
    let report = temp.path().join("report.json");

    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .args(["--format", "json", "--output"])
        .arg(&report)
        .arg("flask")
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to:"));

    let contents = std::fs::read_to_string(&report).unwrap();
    assert!(contents.contains("\"target\": \"Flask\""));
}

#[test]
fn test_explicit_config_file() {
    let (temp, snapshot) = workspace();
    let config = temp.path().join("settings.toml");
    std::fs::write(&config, "protected = [\"pip\", \"blinker\"]\n").unwrap();

    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .arg("--config")
        .arg(&config)
        .args(["--dry-run", "flask"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  - blinker (a dependency of Flask)"))
        .stdout(predicate::str::contains("Total: 3 packages would be uninstalled"));
}

#[test]
fn test_log_file_records_dependent_being_removed() {
    let temp = TempDir::new().unwrap();
    let snapshot = temp.path().join("cycle.json");
    std::fs::write(
        &snapshot,
        r#"{ "packages": [
            { "name": "core", "dependencies": ["plugin"] },
            { "name": "plugin", "dependencies": ["core"] },
            { "name": "user", "dependencies": ["core"] }
        ] }"#,
    )
    .unwrap();
    let log = temp.path().join("run.log");

    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .arg("--log-file")
        .arg(&log)
        .args(["--dry-run", "core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The following packages use core as a dependency:"))
        .stdout(predicate::str::contains("  - user"));

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(
        contents.contains("NOTICE: plugin uses core but is also a dependency of core\n"),
        "{}",
        contents
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_package_fails() {
    let (temp, snapshot) = workspace();
    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .arg("not-installed")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-installed"));
}

#[test]
fn test_failure_does_not_stop_other_targets() {
    let (temp, snapshot) = workspace();
    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .args(["--dry-run", "not-installed", "flask"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Dry run - would uninstall:"))
        .stderr(predicate::str::contains("1 of 2 packages could not be processed"));
}

#[test]
fn test_missing_snapshot_fails() {
    let (temp, _) = workspace();
    pip_remove(temp.path())
        .args(["--index", "missing.json", "flask"])
        .assert()
        .failure();
}

// ============================================================================
// Uninstall
// ============================================================================

#[cfg(unix)]
#[test]
fn test_uninstall_with_stub_interpreter() {
    let (temp, snapshot) = workspace();
    let undo = temp.path().join("undo.sh");

    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .args(["--python", "true", "--yes", "--undo-script"])
        .arg(&undo)
        .arg("flask")
        .assert()
        .success()
        .stdout(predicate::str::contains("Uninstalled 4 packages"));

    let script = std::fs::read_to_string(&undo).unwrap();
    assert!(script.contains("'Flask==3.0.2'"));
    assert!(script.contains("'MarkupSafe==2.1.5'"));
}

#[cfg(unix)]
#[test]
fn test_failed_uninstall_sets_exit_code() {
    let (temp, snapshot) = workspace();
    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .args(["--python", "false", "--yes", "flask"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Uninstall failed"));
}

#[cfg(unix)]
#[test]
fn test_quiet_prints_nothing() {
    let (temp, snapshot) = workspace();
    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .args(["--python", "true", "--quiet", "flask"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[cfg(unix)]
#[test]
fn test_piped_confirmation_reprompts() {
    let (temp, snapshot) = workspace();
    pip_remove(temp.path())
        .arg("--index")
        .arg(&snapshot)
        .args(["--python", "true", "flask"])
        .write_stdin("maybe\nY\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("not a choice, must be y, n, yes or no"))
        .stdout(predicate::str::contains("Uninstalled 4 packages"));
}

#[cfg(unix)]
#[test]
fn test_piped_decline_and_end_of_input() {
    for input in ["n\n", ""] {
        let (temp, snapshot) = workspace();
        pip_remove(temp.path())
            .arg("--index")
            .arg(&snapshot)
            .args(["--python", "false", "flask"])
            .write_stdin(input)
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted."))
            .stdout(predicate::str::contains("Uninstall").not());
    }
}
