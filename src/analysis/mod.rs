// Analysis module - diagnostics, fixes and the detector pipeline

pub mod detectors;
mod engine;
mod fix;
mod registry;

pub use engine::{sort_and_dedup, AnalysisResult, Analyzer, LoadedFile};
pub use fix::{Fix, FixEdit, RemovalTarget};
pub use registry::IssueRegistry;

use crate::tree::Location;
use serde::{Deserialize, Serialize};

/// Rules implemented by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleId {
    /// Call on the unscoped `GlobalScope` singleton
    GlobalScopeUsage,

    /// Job/SupervisorJob/NonCancellable passed into a coroutine builder's context
    JobInBuilderUsage,

    /// Hardcoded color in a resource file instead of a palette reference
    RawColorUsage,
}

/// Rule category, mirrors the host's issue categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Correctness,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Correctness => "correctness",
        }
    }
}

impl RuleId {
    pub const ALL: [RuleId; 3] = [
        RuleId::GlobalScopeUsage,
        RuleId::JobInBuilderUsage,
        RuleId::RawColorUsage,
    ];

    /// Stable identifier used in reports and configuration
    pub fn id(&self) -> &'static str {
        match self {
            RuleId::GlobalScopeUsage => "GlobalScopeUsage",
            RuleId::JobInBuilderUsage => "JobInBuilderUsage",
            RuleId::RawColorUsage => "RawColorUsage",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RuleId::GlobalScopeUsage => "CL001",
            RuleId::JobInBuilderUsage => "CL002",
            RuleId::RawColorUsage => "CL003",
        }
    }

    /// One-line description, used as the diagnostic message
    pub fn brief(&self) -> &'static str {
        match self {
            RuleId::GlobalScopeUsage => {
                "Replace GlobalScope with a scope controlled by the class lifecycle"
            }
            RuleId::JobInBuilderUsage => "Do not pass Job/SupervisorJob to a coroutine builder",
            RuleId::RawColorUsage => "Use colors defined in colors.xml",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            RuleId::GlobalScopeUsage => {
                "Coroutines launched on kotlinx.coroutines.GlobalScope have to be controlled \
                 outside the scope of the class that created them. Uncontrolled global \
                 coroutines waste resources and leak memory; use a lifecycle-bound scope \
                 such as viewModelScope instead."
            }
            RuleId::JobInBuilderUsage => {
                "Although Job and its subtypes are CoroutineContext elements, passing them \
                 to launch/async has no effect on the builder's cancellation or failure \
                 handling, and can break the expected structured-concurrency behavior."
            }
            RuleId::RawColorUsage => {
                "Colors should come from the project palette in res/values/colors.xml \
                 rather than being hardcoded in resource files."
            }
        }
    }

    pub fn category(&self) -> Category {
        Category::Correctness
    }

    pub fn priority(&self) -> u8 {
        6
    }

    pub fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    pub fn from_id(id: &str) -> Option<RuleId> {
        RuleId::ALL
            .into_iter()
            .find(|rule| rule.id().eq_ignore_ascii_case(id) || rule.code().eq_ignore_ascii_case(id))
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Severity levels for diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

/// A finding reported by a detector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub rule: RuleId,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    /// Present only when the rewrite is known to preserve behavior
    pub fix: Option<Fix>,
}

impl Diagnostic {
    pub fn new(rule: RuleId, location: Location) -> Self {
        Self {
            rule,
            severity: rule.default_severity(),
            message: rule.brief().to_string(),
            location,
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn with_optional_fix(mut self, fix: Option<Fix>) -> Self {
        self.fix = fix;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn has_fix(&self) -> bool {
        self.fix.is_some()
    }
}
