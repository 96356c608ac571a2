// Detectors for coroutine and resource anti-patterns

mod globalscope_usage;
mod job_in_builder;
mod raw_color;

pub use globalscope_usage::{GlobalScopeUsageDetector, VIEW_MODEL_ARTIFACT, VIEW_MODEL_SCOPE};
pub use job_in_builder::JobInBuilderUsageDetector;
pub use raw_color::{
    normalize_color, Palette, RawColorUsage, RawColorUsageDetector, DEFAULT_COLORS_FILE,
};

use crate::analysis::{Diagnostic, RuleId};
use crate::parser::xml::{ResourceDocument, ResourceFolderType, XmlAttribute};
use crate::tree::{CallSite, Declaration, DependencySet, SourceFile};

/// What a call detector can see while visiting one call site
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub file: &'a SourceFile,
    pub dependencies: &'a DependencySet,
}

impl<'a> CallContext<'a> {
    pub fn new(file: &'a SourceFile, dependencies: &'a DependencySet) -> Self {
        Self { file, dependencies }
    }

    pub fn enclosing_declaration(&self, site: &CallSite) -> Option<&'a Declaration> {
        self.file.enclosing_declaration(site)
    }
}

/// Single-file detector run once per visited call
///
/// Implementations hold no mutable state, so files can be visited from any
/// number of threads.
pub trait Detector: Send + Sync {
    fn rule(&self) -> RuleId;

    /// Inspect one call site and return its findings
    fn visit_call(&self, ctx: &CallContext<'_>, site: &CallSite) -> Vec<Diagnostic>;

    /// Run the detector over every call site of a file
    fn detect(&self, file: &SourceFile, dependencies: &DependencySet) -> Vec<Diagnostic> {
        let ctx = CallContext::new(file, dependencies);
        file.call_sites
            .iter()
            .flat_map(|site| self.visit_call(&ctx, site))
            .collect()
    }
}

/// Project-wide detector over resource XML
///
/// Visits may arrive concurrently and in any file order; findings are only
/// produced by [`ResourceDetector::finalize`], once every file was visited.
pub trait ResourceDetector: Send + Sync {
    fn rule(&self) -> RuleId;

    fn applies_to(&self, folder_type: ResourceFolderType) -> bool;

    fn visit_document(&self, document: &ResourceDocument);

    fn visit_attribute(&self, document: &ResourceDocument, attribute: &XmlAttribute);

    /// Resolve everything collected during the visit phase
    fn finalize(self: Box<Self>) -> Vec<Diagnostic>;
}
