//! JSON reporter for tooling integration

use super::display_path;
use crate::analysis::{AnalysisResult, Diagnostic, Fix};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    summary: JsonSummary,
    diagnostics: Vec<JsonDiagnostic<'a>>,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    fixable: usize,
    files_analyzed: usize,
    skipped_files: usize,
    by_rule: BTreeMap<&'static str, usize>,
    by_severity: BTreeMap<&'static str, usize>,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    rule: &'static str,
    code: &'static str,
    severity: &'static str,
    message: &'a str,
    file: String,
    line: usize,
    column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<&'a Fix>,
}

pub struct JsonReporter {
    base_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self { base_path: None }
    }

    pub fn with_base_path(mut self, path: PathBuf) -> Self {
        self.base_path = Some(path);
        self
    }

    fn diagnostic<'a>(&self, item: &'a Diagnostic) -> JsonDiagnostic<'a> {
        JsonDiagnostic {
            rule: item.rule.id(),
            code: item.rule.code(),
            severity: item.severity.as_str(),
            message: &item.message,
            file: display_path(&item.location.file, self.base_path.as_deref()),
            line: item.location.line,
            column: item.location.column,
            fix: item.fix.as_ref(),
        }
    }

    pub fn render(&self, result: &AnalysisResult) -> Result<String> {
        let report = JsonReport {
            version: env!("CARGO_PKG_VERSION"),
            summary: JsonSummary {
                total: result.diagnostics.len(),
                fixable: result.fixable_count(),
                files_analyzed: result.files_analyzed(),
                skipped_files: result.skipped_files,
                by_rule: result
                    .count_by_rule()
                    .into_iter()
                    .map(|(rule, count)| (rule.id(), count))
                    .collect(),
                by_severity: result
                    .count_by_severity()
                    .into_iter()
                    .map(|(severity, count)| (severity.as_str(), count))
                    .collect(),
            },
            diagnostics: result.diagnostics.iter().map(|d| self.diagnostic(d)).collect(),
        };

        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        Ok(json)
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}
