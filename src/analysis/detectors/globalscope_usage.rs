//! GlobalScope Usage Detector
//!
//! Detects calls made on `kotlinx.coroutines.GlobalScope`, whatever the
//! builder is called (`launch`, `async`, `actor`, `produce`, ...). The signal
//! is the resolved type of the receiver, not the call name.
//!
//! ## Anti-Pattern
//!
//! ```kotlin
//! class UserViewModel : ViewModel() {
//!     fun load() {
//!         GlobalScope.launch {   // outlives the ViewModel
//!             loadData()
//!         }
//!     }
//! }
//! ```
//!
//! ## Fix
//!
//! Inside a `ViewModel` subclass, when `lifecycle-viewmodel-ktx` is on the
//! classpath, the receiver is rewritten to `viewModelScope`. Everywhere else the
//! finding is reported without a fix: a plain function has no lifecycle scope
//! to fall back to.

use super::{CallContext, Detector};
use crate::analysis::{Diagnostic, Fix, RuleId};
use crate::tree::{names, CallSite, Node};

/// Artifact that provides the `viewModelScope` extension
pub const VIEW_MODEL_ARTIFACT: &str = "androidx.lifecycle:lifecycle-viewmodel-ktx";

pub const VIEW_MODEL_SCOPE: &str = "viewModelScope";

const FIX_DESCRIPTION: &str = "Replace GlobalScope with viewModelScope";

/// Detector for calls on the GlobalScope singleton
pub struct GlobalScopeUsageDetector {
    /// Artifact whose presence enables the viewModelScope fix
    scope_artifact: String,
}

impl GlobalScopeUsageDetector {
    pub fn new() -> Self {
        Self {
            scope_artifact: VIEW_MODEL_ARTIFACT.to_string(),
        }
    }

    /// Check whether the lifecycle scope can replace GlobalScope at this site
    fn lifecycle_scope_available(&self, ctx: &CallContext<'_>, site: &CallSite) -> bool {
        let in_view_model = ctx
            .enclosing_declaration(site)
            .is_some_and(|decl| decl.is_or_extends(names::VIEW_MODEL));
        in_view_model && ctx.dependencies.contains(&self.scope_artifact)
    }
}

impl Default for GlobalScopeUsageDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for GlobalScopeUsageDetector {
    fn rule(&self) -> RuleId {
        RuleId::GlobalScopeUsage
    }

    fn visit_call(&self, ctx: &CallContext<'_>, site: &CallSite) -> Vec<Diagnostic> {
        let call = &site.call;

        // GlobalScope is an object: exact type only, no subtypes
        if !call
            .receiver_type()
            .is_some_and(|ty| ty.is_exactly(names::GLOBAL_SCOPE))
        {
            return Vec::new();
        }

        let fix = match call.receiver() {
            Some(Node::Reference(receiver)) if self.lifecycle_scope_available(ctx, site) => {
                Some(Fix::replace(
                    FIX_DESCRIPTION,
                    receiver.location.clone(),
                    receiver.name.clone(),
                    VIEW_MODEL_SCOPE,
                ))
            }
            _ => None,
        };

        vec![Diagnostic::new(self.rule(), call.location.clone()).with_optional_fix(fix)]
    }
}
