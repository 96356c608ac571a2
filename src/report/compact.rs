//! Compact terminal reporter - minimal output format
//!
//! One line per diagnostic, `path:line:column`, so editors can jump to it

use super::display_path;
use crate::analysis::{AnalysisResult, Diagnostic};
use crate::report::colors::{SeveritySymbol, StructureColors};
use colored::Colorize;
use std::fmt::Write;
use std::path::PathBuf;

/// Compact reporter for minimal, scannable output
pub struct CompactReporter {
    /// Base path to strip from file paths for shorter display
    base_path: Option<PathBuf>,
    /// Maximum width for file paths (truncate if longer)
    max_path_width: usize,
}

impl CompactReporter {
    pub fn new() -> Self {
        Self {
            base_path: None,
            max_path_width: 80,
        }
    }

    pub fn with_base_path(mut self, path: PathBuf) -> Self {
        self.base_path = Some(path);
        self
    }

    pub fn with_max_path_width(mut self, width: usize) -> Self {
        self.max_path_width = width.max(4);
        self
    }

    /// Format a path relative to base path if set, truncated from the left
    fn format_path(&self, diagnostic: &Diagnostic) -> String {
        let display = display_path(&diagnostic.location.file, self.base_path.as_deref());
        let chars = display.chars().count();
        if chars > self.max_path_width {
            let tail: String = display
                .chars()
                .skip(chars - (self.max_path_width - 3))
                .collect();
            format!("...{}", tail)
        } else {
            display
        }
    }

    pub fn render(&self, result: &AnalysisResult) -> String {
        let mut out = String::new();
        for item in &result.diagnostics {
            let position = format!(
                "{}:{}:{}",
                self.format_path(item),
                item.location.line,
                item.location.column
            );
            let fixable = if item.has_fix() { " [fixable]" } else { "" };
            let _ = writeln!(
                out,
                "{}  {}  {}  {}{}",
                StructureColors::location(&position),
                SeveritySymbol::colored(&item.severity),
                StructureColors::rule_code(item.rule.code()),
                item.message,
                fixable.green()
            );
        }

        let _ = writeln!(
            out,
            "{} {} ({} fixable)",
            StructureColors::count(&result.diagnostics.len().to_string()),
            "issues".bold(),
            result.fixable_count()
        );
        out
    }
}

impl Default for CompactReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;

    #[test]
    fn test_one_line_per_diagnostic() {
        colored::control::set_override(false);
        let reporter = CompactReporter::new().with_base_path(PathBuf::from("/project"));
        let out = reporter.render(&fixtures::result());
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("app/src/main/java/a/MainViewModel.kt:12:9"));
        assert!(lines[0].ends_with("[fixable]"));
        assert!(lines[1].contains("CL002"));
        assert!(lines[2].starts_with("app/src/main/res/layout/main.xml:4:9"));
        assert_eq!(lines[3], "3 issues (1 fixable)");
    }

    #[test]
    fn test_path_truncation() {
        let reporter = CompactReporter::new().with_max_path_width(20);
        let result = fixtures::result();
        let formatted = reporter.format_path(&result.diagnostics[0]);
        assert_eq!(formatted.chars().count(), 20);
        assert!(formatted.starts_with("..."));
        assert!(formatted.ends_with("MainViewModel.kt"));
    }
}
