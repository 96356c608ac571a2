//! coroutinelint - coroutine and resource lint rules for Android (Kotlin)
//!
//! Reports three anti-patterns and, where the rewrite is known to be safe,
//! offers an automatic fix:
//! - calls on `GlobalScope`
//! - `Job`/`SupervisorJob`/`NonCancellable` passed to `launch`/`async`
//! - hardcoded colors in resource XML instead of `@color/` references
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find Kotlin sources, resource XML and Gradle files
//! 2. **Parsing** - Kotlin via tree-sitter, resources via quick-xml
//! 3. **Symbol Resolution** - Resolve static types against the project's classes
//! 4. **Detection** - Run call detectors per file, then resolve project-wide state
//! 5. **Reporting / Fixing** - Output results, optionally apply the fixes

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod error;
pub mod parser;
pub mod refactor;
pub mod report;
pub mod tree;

pub use analysis::{AnalysisResult, Analyzer, Diagnostic, Fix, IssueRegistry, RuleId, Severity};
pub use config::Config;
pub use discovery::{FileFinder, ProjectFiles};
pub use error::{LintError, Result};
pub use refactor::FixApplier;
pub use report::{ReportFormat, Reporter};

use std::path::Path;

/// Discover, parse and check the project at `root`
pub fn analyze_project(root: &Path, config: &Config) -> Result<AnalysisResult> {
    let files = FileFinder::new(config).find_files(root)?;
    let dependencies = files.dependencies(&config.dependencies);
    Ok(Analyzer::from_config(config).run(&files, &dependencies))
}
