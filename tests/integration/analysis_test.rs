//! End-to-end tests: discovery, dependency resolution, analysis and fixing
//! over a small Android project laid out in a temp directory.

use coroutinelint::analysis::{Analyzer, RuleId, Severity};
use coroutinelint::{analyze_project, Config, FileFinder, FixApplier};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SOURCES: &str = "app/src/main/java/com/example/app";
const RES: &str = "app/src/main/res";

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn copy_fixture(root: &Path, fixture: &str, target: &str) {
    let target = root.join(target);
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::copy(fixtures_path().join(fixture), target).unwrap();
}

/// Android project with every fixture in its usual place
fn create_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    copy_fixture(root, "gradle/build.gradle.kts", "app/build.gradle.kts");
    for name in ["GlobalScopeUsage.kt", "JobInBuilder.kt", "Clean.kt"] {
        copy_fixture(root, &format!("kotlin/{}", name), &format!("{}/{}", SOURCES, name));
    }
    for res in [
        "values/colors.xml",
        "layout/activity_main.xml",
        "drawable/badge.xml",
    ] {
        copy_fixture(root, &format!("res/{}", res), &format!("{}/{}", RES, res));
    }
    dir
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

#[test]
fn test_full_project_analysis() {
    let dir = create_project();
    let result = analyze_project(dir.path(), &Config::default()).unwrap();

    let counts = result.count_by_rule();
    assert_eq!(counts.get(&RuleId::GlobalScopeUsage), Some(&3));
    assert_eq!(counts.get(&RuleId::JobInBuilderUsage), Some(&4));
    assert_eq!(counts.get(&RuleId::RawColorUsage), Some(&4));
    assert_eq!(result.fixable_count(), 6);

    assert_eq!(result.kotlin_files, 3);
    assert_eq!(result.resource_files, 3);
    assert_eq!(result.skipped_files, 0);
    assert!(!result.has_errors());
}

#[test]
fn test_diagnostics_are_ordered_by_file_and_line() {
    let dir = create_project();
    let result = analyze_project(dir.path(), &Config::default()).unwrap();

    let keys: Vec<_> = result
        .diagnostics
        .iter()
        .map(|d| (d.location.file.clone(), d.location.line, d.location.column))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_dependencies_come_from_build_script() {
    let dir = create_project();
    let files = FileFinder::new(&Config::default())
        .find_files(dir.path())
        .unwrap();
    let deps = files.dependencies(&[]);

    assert!(deps.contains("androidx.lifecycle:lifecycle-viewmodel-ktx"));
    assert!(deps.contains("org.jetbrains.kotlinx:kotlinx-coroutines-android"));
    assert!(!deps.contains("com.android.application"));
}

#[test]
fn test_missing_artifact_disables_global_scope_fix() {
    let dir = create_project();
    fs::write(dir.path().join("app/build.gradle.kts"), "dependencies { }\n").unwrap();
    let result = analyze_project(dir.path(), &Config::default()).unwrap();

    let global: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.rule == RuleId::GlobalScopeUsage)
        .collect();
    assert_eq!(global.len(), 3);
    assert!(global.iter().all(|d| !d.has_fix()));
}

#[test]
fn test_extra_dependency_from_config() {
    let dir = create_project();
    fs::write(dir.path().join("app/build.gradle.kts"), "dependencies { }\n").unwrap();
    let config = Config {
        dependencies: vec!["androidx.lifecycle:lifecycle-viewmodel-ktx".to_string()],
        ..Config::default()
    };
    let result = analyze_project(dir.path(), &config).unwrap();

    let fixable = result
        .diagnostics
        .iter()
        .filter(|d| d.rule == RuleId::GlobalScopeUsage && d.has_fix())
        .count();
    assert_eq!(fixable, 2);
}

#[test]
fn test_disabled_rules_are_not_run() {
    let dir = create_project();
    let mut config = Config::default();
    config.disable(RuleId::RawColorUsage);
    config.disable(RuleId::JobInBuilderUsage);
    let result = analyze_project(dir.path(), &config).unwrap();

    assert_eq!(result.diagnostics.len(), 3);
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.rule == RuleId::GlobalScopeUsage));
    // resource files are not even read without a resource rule
    assert_eq!(result.resource_files, 0);
}

#[test]
fn test_config_file_overrides_severity() {
    let dir = create_project();
    fs::write(
        dir.path().join(".coroutinelint.yml"),
        "rules:\n  CL002:\n    severity: error\n",
    )
    .unwrap();
    let config = Config::from_default_locations(dir.path()).unwrap();
    let result = analyze_project(dir.path(), &config).unwrap();

    assert!(result.has_errors());
    assert_eq!(result.count_by_severity().get(&Severity::Error), Some(&4));
}

#[test]
fn test_sequential_and_parallel_agree() {
    let dir = create_project();
    let config = Config::default();
    let files = FileFinder::new(&config).find_files(dir.path()).unwrap();
    let deps = files.dependencies(&[]);

    let parallel = Analyzer::from_config(&config).with_parallel(true).run(&files, &deps);
    let sequential = Analyzer::from_config(&config).with_parallel(false).run(&files, &deps);
    assert_eq!(parallel.diagnostics, sequential.diagnostics);
}

#[test]
fn test_apply_fixes_to_project() {
    let dir = create_project();
    let root = dir.path();
    let result = analyze_project(root, &Config::default()).unwrap();

    let mut applier = FixApplier::new(false);
    applier.collect(&result.diagnostics);
    assert_eq!(applier.pending(), 6);
    let summary = applier.apply_all();

    assert_eq!(summary.fixes_applied, 6);
    assert_eq!(summary.fixes_failed, 0);
    assert_eq!(summary.files_modified, 4);

    let global = read(root, &format!("{}/GlobalScopeUsage.kt", SOURCES));
    assert!(global.contains("viewModelScope.launch { }"));
    assert!(global.contains("viewModelScope.async { }"));
    assert!(global.contains("    fun sync() {\n        GlobalScope.launch { }"));

    let jobs = read(root, &format!("{}/JobInBuilder.kt", SOURCES));
    assert!(jobs.contains("viewModelScope.launch(Dispatchers.IO) { }"));
    assert!(jobs.contains("withContext(NonCancellable) { }"));

    let layout = read(root, &format!("{}/layout/activity_main.xml", RES));
    assert!(layout.contains(r#"android:background="@color/white""#));
    assert!(layout.contains(r##"android:background="#123456""##));
    let drawable = read(root, &format!("{}/drawable/badge.xml", RES));
    assert!(drawable.contains(r#"android:fillColor="@color/primary""#));

    // only the manual findings are left
    let rerun = analyze_project(root, &Config::default()).unwrap();
    assert_eq!(rerun.diagnostics.len(), 5);
    assert_eq!(rerun.fixable_count(), 0);
}

#[test]
fn test_dry_run_leaves_files_untouched() {
    let dir = create_project();
    let root = dir.path();
    let path = format!("{}/JobInBuilder.kt", SOURCES);
    let before = read(root, &path);

    let result = analyze_project(root, &Config::default()).unwrap();
    let mut applier = FixApplier::new(true);
    applier.collect(&result.diagnostics);
    let summary = applier.apply_all();

    assert_eq!(summary.fixes_applied, 6);
    assert_eq!(summary.files_modified, 4);
    assert_eq!(read(root, &path), before);
}
