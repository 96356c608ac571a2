//! CLI tests for the coroutinelint binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn copy_fixture(root: &Path, fixture: &str, target: &str) {
    let target = root.join(target);
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::copy(fixtures_path().join(fixture), target).unwrap();
}

fn create_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    copy_fixture(root, "gradle/build.gradle.kts", "app/build.gradle.kts");
    for name in ["GlobalScopeUsage.kt", "JobInBuilder.kt", "Clean.kt"] {
        copy_fixture(
            root,
            &format!("kotlin/{}", name),
            &format!("app/src/main/java/com/example/app/{}", name),
        );
    }
    for res in ["values/colors.xml", "layout/activity_main.xml", "drawable/badge.xml"] {
        copy_fixture(root, &format!("res/{}", res), &format!("app/src/main/res/{}", res));
    }
    dir
}

fn coroutinelint() -> Command {
    let mut cmd = Command::cargo_bin("coroutinelint").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_list_rules() {
    coroutinelint()
        .arg("--list-rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("CL001"))
        .stdout(predicate::str::contains("GlobalScopeUsage"))
        .stdout(predicate::str::contains("JobInBuilderUsage"))
        .stdout(predicate::str::contains("RawColorUsage"));
}

#[test]
fn test_list_rules_verbose_explains() {
    coroutinelint()
        .args(["--list-rules", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("correctness"))
        .stdout(predicate::str::contains("P6"))
        .stdout(predicate::str::contains("lifecycle-bound scope"))
        .stdout(predicate::str::contains("res/values/colors.xml"));
}

#[test]
fn test_completions() {
    coroutinelint()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("coroutinelint"));
}

#[test]
fn test_json_output() {
    let dir = create_project();
    let output = coroutinelint()
        .arg(dir.path())
        .args(["--format", "json", "--quiet"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["total"], 11);
    assert_eq!(json["summary"]["fixable"], 6);
    assert_eq!(json["summary"]["by_rule"]["JobInBuilderUsage"], 4);
    assert_eq!(json["diagnostics"].as_array().unwrap().len(), 11);
}

#[test]
fn test_compact_output() {
    let dir = create_project();
    coroutinelint()
        .arg(dir.path())
        .args(["--format", "compact", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GlobalScopeUsage.kt:12:9"))
        .stdout(predicate::str::contains("11 issues (6 fixable)"));
}

#[test]
fn test_terminal_output() {
    let dir = create_project();
    coroutinelint()
        .arg(dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 11 issues:"))
        .stdout(predicate::str::contains("[CL002]"));
}

#[test]
fn test_error_severity_sets_exit_code() {
    let dir = create_project();
    let config = dir.path().join("lint.toml");
    fs::write(&config, "[rules.GlobalScopeUsage]\nseverity = \"error\"\n").unwrap();

    coroutinelint()
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("--quiet")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("3 errors"));
}

#[test]
fn test_disable_rule() {
    let dir = create_project();
    coroutinelint()
        .arg(dir.path())
        .args(["--disable", "CL003", "--disable", "JobInBuilderUsage"])
        .args(["--format", "compact", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 issues (2 fixable)"));
}

#[test]
fn test_unknown_rule_is_rejected() {
    let dir = create_project();
    coroutinelint()
        .arg(dir.path())
        .args(["--disable", "NoSuchRule"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown rule 'NoSuchRule'"));
}

#[test]
fn test_fix_rewrites_files() {
    let dir = create_project();
    coroutinelint()
        .arg(dir.path())
        .args(["--fix", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 6 fixes in 4 files"));

    let source = fs::read_to_string(
        dir.path()
            .join("app/src/main/java/com/example/app/JobInBuilder.kt"),
    )
    .unwrap();
    assert!(source.contains("viewModelScope.launch(Dispatchers.IO) { }"));
}

#[test]
fn test_dry_run_does_not_write() {
    let dir = create_project();
    let path = dir
        .path()
        .join("app/src/main/java/com/example/app/GlobalScopeUsage.kt");
    let before = fs::read_to_string(&path).unwrap();

    coroutinelint()
        .arg(dir.path())
        .args(["--dry-run", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would apply 6 fixes in 4 files"));

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_empty_project() {
    let dir = TempDir::new().unwrap();
    coroutinelint()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No Kotlin or resource files found."));
}

#[test]
fn test_output_file() {
    let dir = create_project();
    let report = dir.path().join("report.json");
    coroutinelint()
        .arg(dir.path())
        .args(["--format", "json", "--quiet", "--output"])
        .arg(&report)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["summary"]["total"], 11);
}
