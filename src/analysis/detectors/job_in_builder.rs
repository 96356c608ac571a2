//! Job In Builder Detector
//!
//! Detects `Job`, `SupervisorJob` and `NonCancellable` passed as the context
//! argument of `launch`/`async`. The builder creates its own child `Job`, so a
//! job handed in through the context has no effect on cancellation or on how
//! failures propagate.
//!
//! ## Anti-Pattern
//!
//! ```kotlin
//! viewModelScope.launch(SupervisorJob() + Dispatchers.IO) { }  // supervision is not applied
//! viewModelScope.launch(Job()) { }                            // detaches from the scope
//! scope.launch(job) { }
//! launch(NonCancellable) { }                                   // meant withContext(NonCancellable)
//! ```
//!
//! ## Detection Algorithm
//!
//! The first argument is decomposed recursively: parentheses are unwrapped,
//! `+` compositions are split into left and right operands, and every call or
//! reference whose type is-or-extends `Job` is reported on its own.
//!
//! ## Fixes
//!
//! - `SupervisorJob()` on `viewModelScope` inside a `ViewModel`: the term is
//!   deleted along with its parentheses and the `+` joining it to a neighbour.
//! - `NonCancellable` as the whole argument of a receiver-less `launch`: the
//!   builder is renamed to `withContext`. `async` keeps no fix, since its
//!   caller expects a `Deferred`.
//! - Anything else is reported without a fix.

use super::globalscope_usage::VIEW_MODEL_SCOPE;
use super::{CallContext, Detector};
use crate::analysis::{Diagnostic, Fix, RemovalTarget, RuleId};
use crate::tree::{is_or_extends, names, CallExpr, CallSite, Node};

/// Builders whose first argument is an optional coroutine context
pub const BUILDER_NAMES: [&str; 2] = ["launch", "async"];

const SUPERVISOR_JOB: &str = "SupervisorJob";
const LAUNCH: &str = "launch";
const WITH_CONTEXT: &str = "withContext";
const SUPERVISOR_JOB_FIX: &str = "Remove SupervisorJob";

/// Where a term sits inside the context argument
#[derive(Debug, Clone, PartialEq, Eq)]
enum OperandSide {
    /// The term is the whole argument
    Whole,
    /// Left of a binary operator
    Left(String),
    /// Right of a binary operator
    Right(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Operand {
    side: OperandSide,
    /// Parentheses directly around the term
    parens: usize,
}

impl Operand {
    fn whole() -> Self {
        Self {
            side: OperandSide::Whole,
            parens: 0,
        }
    }

    fn left(operator: &str) -> Self {
        Self {
            side: OperandSide::Left(operator.to_string()),
            parens: 0,
        }
    }

    fn right(operator: &str) -> Self {
        Self {
            side: OperandSide::Right(operator.to_string()),
            parens: 0,
        }
    }

    fn parenthesized(&self) -> Self {
        Self {
            side: self.side.clone(),
            parens: self.parens + 1,
        }
    }

    /// Removal pattern for the term's exact text in this position
    fn removal_target(&self, term: &str) -> RemovalTarget {
        let target = RemovalTarget::term(term).with_parens(self.parens);
        match &self.side {
            OperandSide::Whole => target,
            OperandSide::Left(op) => target.with_trailing_operator(op),
            OperandSide::Right(op) => target.with_leading_operator(op),
        }
    }
}

/// Detector for jobs passed into coroutine builders
pub struct JobInBuilderUsageDetector;

impl JobInBuilderUsageDetector {
    pub fn new() -> Self {
        Self
    }

    /// Builder runs on `viewModelScope` inside a ViewModel subclass
    fn is_on_view_model_scope(ctx: &CallContext<'_>, site: &CallSite) -> bool {
        let in_view_model = ctx
            .enclosing_declaration(site)
            .is_some_and(|decl| decl.is_or_extends(names::VIEW_MODEL));
        let on_scope = matches!(
            site.call.receiver(),
            Some(Node::Reference(r)) if r.is_simple_name() && r.name == VIEW_MODEL_SCOPE
        );
        in_view_model && on_scope
    }

    fn check_argument(
        &self,
        source: &str,
        argument: &Node,
        operand: Operand,
        builder: &CallExpr,
        on_view_model_scope: bool,
        issues: &mut Vec<Diagnostic>,
    ) {
        match argument {
            Node::Parenthesized(paren) => self.check_argument(
                source,
                &paren.inner,
                operand.parenthesized(),
                builder,
                on_view_model_scope,
                issues,
            ),
            Node::BinaryOp(binary) => {
                self.check_argument(
                    source,
                    &binary.left,
                    Operand::left(&binary.operator),
                    builder,
                    on_view_model_scope,
                    issues,
                );
                self.check_argument(
                    source,
                    &binary.right,
                    Operand::right(&binary.operator),
                    builder,
                    on_view_model_scope,
                    issues,
                );
            }
            Node::Call(call) => {
                if !is_or_extends(call.ty.as_ref(), names::JOB) {
                    return;
                }
                let removable = call.callee == SUPERVISOR_JOB
                    && call.arguments.is_empty()
                    && is_or_extends(call.ty.as_ref(), names::COMPLETABLE_JOB)
                    && on_view_model_scope;
                let term = source.get(call.location.start_byte..call.location.end_byte);
                let fix = match (builder.first_argument(), term) {
                    (Some(whole), Some(term)) if removable => Some(Fix::replace_pattern(
                        SUPERVISOR_JOB_FIX,
                        whole.location().clone(),
                        operand.removal_target(term).pattern(),
                        "",
                    )),
                    _ => None,
                };
                issues.push(
                    Diagnostic::new(self.rule(), call.location.clone()).with_optional_fix(fix),
                );
            }
            Node::Reference(reference) => {
                if !is_or_extends(reference.ty.as_ref(), names::JOB) {
                    return;
                }
                let non_cancellable = reference
                    .ty
                    .as_ref()
                    .is_some_and(|ty| ty.is_exactly(names::NON_CANCELLABLE));
                if non_cancellable
                    && operand.side == OperandSide::Whole
                    && builder.receiver.is_none()
                    && builder.callee == LAUNCH
                {
                    let fix = Fix::replace(
                        format!("Replace {} with {}", builder.callee, WITH_CONTEXT),
                        builder.callee_location.clone(),
                        builder.callee.clone(),
                        WITH_CONTEXT,
                    );
                    issues.push(
                        Diagnostic::new(self.rule(), builder.location.clone()).with_fix(fix),
                    );
                } else {
                    issues.push(Diagnostic::new(self.rule(), reference.location.clone()));
                }
            }
            Node::Literal(_) => {}
        }
    }
}

impl Default for JobInBuilderUsageDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for JobInBuilderUsageDetector {
    fn rule(&self) -> RuleId {
        RuleId::JobInBuilderUsage
    }

    fn visit_call(&self, ctx: &CallContext<'_>, site: &CallSite) -> Vec<Diagnostic> {
        let builder = &site.call;
        if !BUILDER_NAMES.contains(&builder.callee.as_str()) {
            return Vec::new();
        }
        let Some(argument) = builder.first_argument() else {
            return Vec::new();
        };

        let on_view_model_scope = Self::is_on_view_model_scope(ctx, site);
        let mut issues = Vec::new();
        self.check_argument(
            &ctx.file.text,
            argument,
            Operand::whole(),
            builder,
            on_view_model_scope,
            &mut issues,
        );
        issues
    }
}
