//! Integration tests for each detector type
//!
//! Fixture sources are parsed with the real Kotlin and XML front ends, then
//! handed to one detector at a time.

use coroutinelint::analysis::detectors::{
    Detector, GlobalScopeUsageDetector, JobInBuilderUsageDetector, RawColorUsageDetector,
    ResourceDetector, VIEW_MODEL_ARTIFACT,
};
use coroutinelint::analysis::{Diagnostic, FixEdit, RuleId};
use coroutinelint::parser::{parse_resource_file, KotlinParser, SymbolTable};
use coroutinelint::refactor::apply_to_text;
use coroutinelint::tree::{DependencySet, SourceFile};
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(relative: &str) -> (PathBuf, String) {
    let path = fixtures_path().join(relative);
    if !path.exists() {
        panic!("Fixture not found: {:?}", path);
    }
    let text = fs::read_to_string(&path).expect("Failed to read fixture");
    (path, text)
}

/// Parse a Kotlin fixture against a table built from that file alone
fn parse_kotlin(filename: &str) -> SourceFile {
    let (path, text) = read_fixture(&format!("kotlin/{}", filename));
    let parser = KotlinParser::new();
    let outline = parser.outline(&path, &text).expect("Failed to outline file");
    let mut table = SymbolTable::new();
    table.register_project(&outline.classes);
    parser.parse(&path, &text, &table).expect("Failed to parse file")
}

fn lifecycle_deps() -> DependencySet {
    [format!("{}:2.6.1", VIEW_MODEL_ARTIFACT)].into_iter().collect()
}

fn lines(issues: &[Diagnostic]) -> Vec<usize> {
    issues.iter().map(|d| d.location.line).collect()
}

fn apply_all(source: &SourceFile, issues: &[Diagnostic]) -> String {
    let fixes: Vec<_> = issues.iter().filter_map(|d| d.fix.clone()).collect();
    apply_to_text(&source.text, &fixes).expect("fixes apply").text
}

// ============================================================================
// GlobalScope Usage Tests
// ============================================================================

mod globalscope_tests {
    use super::*;

    #[test]
    fn test_every_global_scope_call_is_reported() {
        let file = parse_kotlin("GlobalScopeUsage.kt");
        let issues = GlobalScopeUsageDetector::new().detect(&file, &lifecycle_deps());

        assert_eq!(lines(&issues), vec![12, 13, 19]);
        assert!(issues.iter().all(|d| d.rule == RuleId::GlobalScopeUsage));
    }

    #[test]
    fn test_fix_only_inside_view_model() {
        let file = parse_kotlin("GlobalScopeUsage.kt");
        let issues = GlobalScopeUsageDetector::new().detect(&file, &lifecycle_deps());

        // ProfileViewModel extends ViewModel through BaseViewModel
        assert!(issues[0].has_fix());
        assert!(issues[1].has_fix());
        // ProfileRepository has no lifecycle scope
        assert!(!issues[2].has_fix());

        let fixed = apply_all(&file, &issues);
        assert!(fixed.contains("        viewModelScope.launch { }\n        viewModelScope.async { }"));
        assert!(fixed.contains("    fun sync() {\n        GlobalScope.launch { }"));
    }

    #[test]
    fn test_no_fix_without_lifecycle_artifact() {
        let file = parse_kotlin("GlobalScopeUsage.kt");
        let issues = GlobalScopeUsageDetector::new().detect(&file, &DependencySet::new());

        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|d| !d.has_fix()));
    }

    #[test]
    fn test_clean_file_has_no_issues() {
        let file = parse_kotlin("Clean.kt");
        let issues = GlobalScopeUsageDetector::new().detect(&file, &lifecycle_deps());
        assert!(issues.is_empty());
    }
}

// ============================================================================
// Job In Builder Tests
// ============================================================================

mod job_in_builder_tests {
    use super::*;

    fn issues() -> (SourceFile, Vec<Diagnostic>) {
        let file = parse_kotlin("JobInBuilder.kt");
        let issues = JobInBuilderUsageDetector::new().detect(&file, &DependencySet::new());
        (file, issues)
    }

    #[test]
    fn test_job_arguments_reported() {
        let (_, issues) = issues();

        // SupervisorJob(), Job(), parent, NonCancellable; Dispatchers.Main is fine
        assert_eq!(lines(&issues), vec![15, 16, 17, 23]);
        assert!(issues.iter().all(|d| d.rule == RuleId::JobInBuilderUsage));
    }

    #[test]
    fn test_supervisor_job_is_reported_on_the_term() {
        let (file, issues) = issues();
        assert_eq!(issues[0].location.slice(&file.text), Some("SupervisorJob()"));
        assert_eq!(issues[2].location.slice(&file.text), Some("parent"));
    }

    #[test]
    fn test_fixable_cases() {
        let (_, issues) = issues();
        let fixable: Vec<bool> = issues.iter().map(Diagnostic::has_fix).collect();
        assert_eq!(fixable, vec![true, false, false, true]);

        let supervisor = issues[0].fix.as_ref().unwrap();
        assert!(matches!(supervisor.edit, FixEdit::ReplacePattern { .. }));
        assert_eq!(supervisor.description, "Remove SupervisorJob");

        let rename = issues[3].fix.as_ref().unwrap();
        assert_eq!(rename.replacement(), "withContext");
    }

    #[test]
    fn test_fixes_rewrite_source() {
        let (file, issues) = issues();
        let fixed = apply_all(&file, &issues);

        assert!(fixed.contains("viewModelScope.launch(Dispatchers.IO) { }"));
        assert!(fixed.contains("withContext(NonCancellable) { }"));
        // unfixable findings are left alone
        assert!(fixed.contains("viewModelScope.async(Job()) { }"));
        assert!(fixed.contains("viewModelScope.launch(parent) { }"));
    }

    #[test]
    fn test_clean_file_has_no_issues() {
        let file = parse_kotlin("Clean.kt");
        let issues = JobInBuilderUsageDetector::new().detect(&file, &DependencySet::new());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_qualified_and_named_contexts() {
        let file = parse_kotlin("QualifiedContext.kt");
        let issues = JobInBuilderUsageDetector::new().detect(&file, &DependencySet::new());

        // both SupervisorJob() calls, `job`, the named context, async(NonCancellable)
        assert_eq!(lines(&issues), vec![14, 15, 15, 16, 20]);
        assert_eq!(
            issues[0].location.slice(&file.text),
            Some("kotlinx.coroutines.SupervisorJob()")
        );
        assert_eq!(issues[3].location.slice(&file.text), Some("Job()"));
        assert_eq!(issues[4].location.slice(&file.text), Some("NonCancellable"));

        let fixable: Vec<bool> = issues.iter().map(Diagnostic::has_fix).collect();
        assert_eq!(fixable, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_qualified_supervisor_job_removed_whole() {
        let file = parse_kotlin("QualifiedContext.kt");
        let issues = JobInBuilderUsageDetector::new().detect(&file, &DependencySet::new());
        let fixed = apply_all(&file, &issues);

        assert!(fixed.contains("        viewModelScope.launch() { }\n"));
        assert!(fixed.contains("        viewModelScope.launch(job) { }\n"));
        assert!(!fixed.contains("kotlinx.coroutines.)"));
        assert!(!fixed.contains("kotlinx.coroutines.job"));
        // async keeps its Deferred result
        assert!(fixed.contains("async(NonCancellable) { 1 }"));
    }
}

// ============================================================================
// Raw Color Tests
// ============================================================================

mod raw_color_tests {
    use super::*;

    fn run(files: &[&str]) -> Vec<Diagnostic> {
        let detector = Box::new(RawColorUsageDetector::new());
        for relative in files {
            let document =
                parse_resource_file(&fixtures_path().join(relative)).expect("Failed to parse");
            if !detector.applies_to(document.folder_type) {
                continue;
            }
            detector.visit_document(&document);
            for attribute in document.attributes() {
                detector.visit_attribute(&document, attribute);
            }
        }
        let mut issues = detector.finalize();
        issues.sort_by(|a, b| a.location.cmp(&b.location));
        issues
    }

    #[test]
    fn test_layout_colors_reported() {
        let issues = run(&["res/values/colors.xml", "res/layout/activity_main.xml"]);

        // background="#fff", background="#123456", tint="@android:color/black"
        assert_eq!(lines(&issues), vec![5, 11, 16]);
        assert!(issues.iter().all(|d| d.rule == RuleId::RawColorUsage));
    }

    #[test]
    fn test_palette_matches_get_fixes() {
        let issues = run(&[
            "res/layout/activity_main.xml",
            "res/drawable/badge.xml",
            "res/values/colors.xml",
        ]);
        let replacements: Vec<Option<&str>> = issues
            .iter()
            .map(|d| d.fix.as_ref().map(|f| f.replacement()))
            .collect();

        // drawable sorts before layout
        assert_eq!(
            replacements,
            vec![Some("@color/primary"), Some("@color/white"), None, None]
        );
    }

    #[test]
    fn test_without_palette_nothing_is_fixable() {
        let issues = run(&["res/layout/activity_main.xml"]);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|d| !d.has_fix()));
    }
}
