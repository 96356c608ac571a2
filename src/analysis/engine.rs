//! Analysis pipeline
//!
//! Phase 1 parses Kotlin sources and visits resource files, in parallel when
//! enabled. Call detectors report immediately; resource detectors only collect.
//! Phase 2 runs after every visit finished and lets the resource detectors
//! resolve what they collected. The result is sorted and deduplicated.

use super::detectors::ResourceDetector;
use super::{Diagnostic, IssueRegistry, RuleId, Severity};
use crate::config::Config;
use crate::discovery::ProjectFiles;
use crate::error::LintError;
use crate::parser::{parse_resource, ClassHeader, KotlinParser, SymbolTable};
use crate::tree::{DependencySet, SourceFile};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisResult {
    pub diagnostics: Vec<Diagnostic>,
    pub kotlin_files: usize,
    pub resource_files: usize,
    /// Files that could not be read or parsed
    pub skipped_files: usize,
}

impl AnalysisResult {
    pub fn files_analyzed(&self) -> usize {
        self.kotlin_files + self.resource_files
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn fixable_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.has_fix()).count()
    }

    pub fn count_by_rule(&self) -> BTreeMap<RuleId, usize> {
        let mut counts = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            *counts.entry(diagnostic.rule).or_insert(0) += 1;
        }
        counts
    }

    pub fn count_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            *counts.entry(diagnostic.severity).or_insert(0) += 1;
        }
        counts
    }
}

/// A file loaded into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub text: String,
}

impl LoadedFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Runs the enabled detectors over a project
pub struct Analyzer {
    registry: IssueRegistry,
    parallel: bool,
    progress: Option<ProgressBar>,
}

impl Analyzer {
    pub fn new(registry: IssueRegistry) -> Self {
        Self {
            registry,
            parallel: true,
            progress: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(IssueRegistry::from_config(config)).with_parallel(config.parallel)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Advance `progress` once per visited file
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn registry(&self) -> &IssueRegistry {
        &self.registry
    }

    fn map_files<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }

    fn tick(&self) {
        if let Some(progress) = &self.progress {
            progress.inc(1);
        }
    }

    /// Read the discovered files and analyse them
    pub fn run(&self, files: &ProjectFiles, dependencies: &DependencySet) -> AnalysisResult {
        let load = |path: &PathBuf| match std::fs::read_to_string(path) {
            Ok(text) => Some(LoadedFile::new(path.clone(), text)),
            Err(e) => {
                warn!("{}", LintError::io(path, e));
                None
            }
        };

        let kotlin: Vec<Option<LoadedFile>> = self.map_files(&files.kotlin, load);
        let resources: Vec<Option<LoadedFile>> = if self.registry.has_resource_detectors() {
            self.map_files(&files.resources, load)
        } else {
            Vec::new()
        };
        let unreadable = kotlin.iter().chain(&resources).filter(|f| f.is_none()).count();

        let kotlin: Vec<LoadedFile> = kotlin.into_iter().flatten().collect();
        let resources: Vec<LoadedFile> = resources.into_iter().flatten().collect();

        let mut result = self.analyze(&kotlin, &resources, dependencies);
        result.skipped_files += unreadable;
        result
    }

    /// Analyse files already in memory
    pub fn analyze(
        &self,
        kotlin: &[LoadedFile],
        resources: &[LoadedFile],
        dependencies: &DependencySet,
    ) -> AnalysisResult {
        let start = Instant::now();
        let parser = KotlinParser::new();

        // Phase 1a: project-wide symbols
        let outlines = self.map_files(kotlin, |file| parser.outline(&file.path, &file.text));
        let mut headers: Vec<ClassHeader> = Vec::new();
        for outline in outlines.into_iter().flatten() {
            headers.extend(outline.classes);
        }
        let mut table = SymbolTable::new();
        table.register_project(&headers);
        debug!("Symbol table has {} classes", table.class_count());

        // Phase 1b: call detectors
        let per_file: Vec<Option<Vec<Diagnostic>>> = self.map_files(kotlin, |file| {
            let parsed = parser.parse(&file.path, &file.text, &table);
            self.tick();
            match parsed {
                Ok(source) => Some(self.check_source(&source, dependencies)),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            }
        });
        let kotlin_skipped = per_file.iter().filter(|d| d.is_none()).count();
        let mut skipped = kotlin_skipped;
        let mut diagnostics: Vec<Diagnostic> = per_file.into_iter().flatten().flatten().collect();

        // Phase 1c: resource visits
        let resource_detectors = self.registry.resource_detectors();
        if !resource_detectors.is_empty() {
            let visited = self.map_files(resources, |file| {
                let visited = visit_resource(&resource_detectors, file);
                self.tick();
                visited
            });
            skipped += visited.iter().filter(|ok| !**ok).count();
        }

        // Phase 2: resolve project-wide state
        for detector in resource_detectors {
            let rule = detector.rule();
            let found = detector.finalize();
            debug!("{} reported {} issues", rule, found.len());
            diagnostics.extend(found);
        }

        let mut diagnostics: Vec<Diagnostic> = diagnostics
            .into_iter()
            .map(|d| {
                let severity = self.registry.severity(d.rule);
                d.with_severity(severity)
            })
            .collect();
        sort_and_dedup(&mut diagnostics);

        info!(
            "Analyzed {} Kotlin and {} resource files in {:.2}s: {} issues",
            kotlin.len(),
            resources.len(),
            start.elapsed().as_secs_f64(),
            diagnostics.len()
        );

        AnalysisResult {
            diagnostics,
            kotlin_files: kotlin.len() - kotlin_skipped,
            resource_files: resources.len() - (skipped - kotlin_skipped),
            skipped_files: skipped,
        }
    }

    /// Run every call detector over one parsed file
    pub fn check_source(&self, source: &SourceFile, dependencies: &DependencySet) -> Vec<Diagnostic> {
        self.registry
            .call_detectors()
            .iter()
            .flat_map(|detector| detector.detect(source, dependencies))
            .collect()
    }
}

/// Feed one resource file to the detectors; `false` if it did not parse
fn visit_resource(detectors: &[Box<dyn ResourceDetector>], file: &LoadedFile) -> bool {
    let document = match parse_resource(&file.path, &file.text) {
        Ok(document) => document,
        Err(e) => {
            warn!("{}", e);
            return false;
        }
    };
    for detector in detectors {
        if !detector.applies_to(document.folder_type) {
            continue;
        }
        detector.visit_document(&document);
        for attribute in document.attributes() {
            detector.visit_attribute(&document, attribute);
        }
    }
    true
}

/// Order by (file, line, column, rule) and drop repeats of the same finding
pub fn sort_and_dedup(diagnostics: &mut Vec<Diagnostic>) {
    diagnostics.sort_by(|a, b| {
        (&a.location.file, a.location.line, a.location.column, a.rule).cmp(&(
            &b.location.file,
            b.location.line,
            b.location.column,
            b.rule,
        ))
    });
    diagnostics.dedup_by(|a, b| a.rule == b.rule && a.location == b.location);
}
