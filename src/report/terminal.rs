//! Terminal reporter with colored output
//!
//! Based on Rust compiler diagnostic design (RFC 1644)

use super::display_path;
use crate::analysis::{AnalysisResult, Diagnostic, RuleId, Severity};
use crate::report::colors::{BoxChars, FixIndicator, SeveritySymbol, StructureColors};
use colored::Colorize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Terminal reporter, diagnostics grouped by file
pub struct TerminalReporter {
    base_path: Option<PathBuf>,
    /// Print the suggested replacement under each fixable diagnostic
    show_fixes: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            base_path: None,
            show_fixes: true,
        }
    }

    pub fn with_base_path(mut self, path: PathBuf) -> Self {
        self.base_path = Some(path);
        self
    }

    pub fn with_fixes(mut self, show: bool) -> Self {
        self.show_fixes = show;
        self
    }

    pub fn render(&self, result: &AnalysisResult) -> String {
        let mut out = String::new();
        let diagnostics = &result.diagnostics;

        if diagnostics.is_empty() {
            let _ = writeln!(out, "{}", "No coroutine or color issues found!".green().bold());
            return out;
        }

        // Group by file
        let mut by_file: BTreeMap<&Path, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in diagnostics {
            by_file
                .entry(diagnostic.location.file.as_path())
                .or_default()
                .push(diagnostic);
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Found {} issues:",
            StructureColors::count(&diagnostics.len().to_string())
        );
        let _ = writeln!(out);

        for (file, items) in by_file {
            let path = display_path(file, self.base_path.as_deref());
            let _ = writeln!(out, "{}", StructureColors::file_path(&path));
            for item in items {
                self.render_item(&mut out, item);
            }
            let _ = writeln!(out);
        }

        self.render_summary(&mut out, result);
        out
    }

    fn render_item(&self, out: &mut String, item: &Diagnostic) {
        let location = format!("{:>5}:{:<3}", item.location.line, item.location.column);
        let _ = writeln!(
            out,
            "  {} {} [{}] {} ({})",
            StructureColors::location(&location),
            SeveritySymbol::colored(&item.severity),
            StructureColors::rule_code(item.rule.code()),
            item.message,
            FixIndicator::for_diagnostic(item.has_fix())
        );

        if let Some(fix) = item.fix.as_ref().filter(|_| self.show_fixes) {
            let _ = writeln!(
                out,
                "    {} {}: '{}'",
                "→".dimmed(),
                fix.description.dimmed(),
                StructureColors::symbol_name(fix.replacement())
            );
        }
    }

    fn render_summary(&self, out: &mut String, result: &AnalysisResult) {
        let _ = writeln!(out, "{}", BoxChars::heavy_line(50).dimmed());

        let by_rule = result.count_by_rule();
        for rule in RuleId::ALL {
            if let Some(count) = by_rule.get(&rule) {
                let _ = writeln!(
                    out,
                    "  {} {:<20} {}",
                    StructureColors::rule_code(rule.code()),
                    rule.id(),
                    StructureColors::count(&count.to_string())
                );
            }
        }
        let _ = writeln!(out, "{}", BoxChars::light_line(50).dimmed());

        let by_severity = result.count_by_severity();
        let count = |severity: Severity| by_severity.get(&severity).copied().unwrap_or(0);
        let mut parts = Vec::new();
        if count(Severity::Error) > 0 {
            parts.push(format!("{} {}", count(Severity::Error), "errors".red()));
        }
        if count(Severity::Warning) > 0 {
            parts.push(format!("{} {}", count(Severity::Warning), "warnings".yellow()));
        }
        if count(Severity::Info) > 0 {
            parts.push(format!("{} {}", count(Severity::Info), "info".blue()));
        }

        let _ = writeln!(
            out,
            "  {} {} ({}), {} fixable, {} files analyzed",
            StructureColors::count(&result.diagnostics.len().to_string()),
            "issues".bold(),
            parts.join(", "),
            result.fixable_count(),
            result.files_analyzed()
        );
        if result.skipped_files > 0 {
            let _ = writeln!(
                out,
                "  {}",
                format!("{} files skipped (see warnings)", result.skipped_files).yellow()
            );
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
