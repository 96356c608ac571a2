//! Static type references with ancestor lookup

use serde::Serialize;
use std::fmt;

/// Fully-qualified names of the library types the rules ask about
pub mod names {
    pub const COROUTINE_SCOPE: &str = "kotlinx.coroutines.CoroutineScope";
    pub const GLOBAL_SCOPE: &str = "kotlinx.coroutines.GlobalScope";
    pub const COROUTINE_CONTEXT: &str = "kotlin.coroutines.CoroutineContext";
    pub const COROUTINE_CONTEXT_ELEMENT: &str = "kotlin.coroutines.CoroutineContext.Element";
    pub const COROUTINE_DISPATCHER: &str = "kotlinx.coroutines.CoroutineDispatcher";
    pub const JOB: &str = "kotlinx.coroutines.Job";
    pub const COMPLETABLE_JOB: &str = "kotlinx.coroutines.CompletableJob";
    pub const NON_CANCELLABLE: &str = "kotlinx.coroutines.NonCancellable";
    pub const VIEW_MODEL: &str = "androidx.lifecycle.ViewModel";
    pub const ANDROID_VIEW_MODEL: &str = "androidx.lifecycle.AndroidViewModel";
    pub const LIFECYCLE_COROUTINE_SCOPE: &str = "androidx.lifecycle.LifecycleCoroutineScope";
    pub const ANY: &str = "kotlin.Any";
}

/// A resolved static type: canonical name plus its direct supertypes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRef {
    qualified_name: String,
    ancestors: Vec<TypeRef>,
}

impl TypeRef {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            ancestors: Vec::new(),
        }
    }

    pub fn with_ancestor(mut self, ancestor: TypeRef) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    pub fn with_ancestors(mut self, ancestors: impl IntoIterator<Item = TypeRef>) -> Self {
        self.ancestors.extend(ancestors);
        self
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Last segment of the qualified name
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    pub fn ancestors(&self) -> &[TypeRef] {
        &self.ancestors
    }

    /// Identity check, no ancestor walk
    pub fn is_exactly(&self, candidate: &str) -> bool {
        self.qualified_name == candidate
    }

    /// True if this type or any transitive ancestor is `candidate`
    pub fn is_or_extends(&self, candidate: &str) -> bool {
        let mut pending = vec![self];
        while let Some(ty) = pending.pop() {
            if ty.qualified_name == candidate {
                return true;
            }
            pending.extend(ty.ancestors.iter());
        }
        false
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name)
    }
}

/// `is_or_extends` over an optional type; unresolved types never match
pub fn is_or_extends(ty: Option<&TypeRef>, candidate: &str) -> bool {
    ty.is_some_and(|ty| ty.is_or_extends(candidate))
}
