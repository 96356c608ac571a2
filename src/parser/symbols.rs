//! Static symbol resolution for Kotlin sources
//!
//! The table knows the handful of kotlinx.coroutines and androidx.lifecycle
//! symbols the rules ask about, plus every class-like declaration found in the
//! analysed project. Simple names resolve through a file's [`Imports`]; a name
//! that cannot be resolved yields `None`, which never matches a rule.

use crate::tree::{names, DeclarationKind, TypeRef};
use std::collections::{HashMap, HashSet};

const DISPATCHERS: &str = "kotlinx.coroutines.Dispatchers";
const DEFERRED: &str = "kotlinx.coroutines.Deferred";

/// Import directives and package of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Imports {
    package: Option<String>,
    /// Simple name (or alias) to qualified name
    explicit: HashMap<String, String>,
    /// Packages imported with `.*`
    stars: Vec<String>,
}

impl Imports {
    pub fn new(package: Option<String>) -> Self {
        Self {
            package: package.filter(|p| !p.is_empty()),
            ..Self::default()
        }
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Record `import a.b.C`, `import a.b.C as D` or `import a.b.*`
    pub fn add(&mut self, path: &str, alias: Option<&str>) {
        if let Some(package) = path.strip_suffix(".*") {
            self.stars.push(package.to_string());
            return;
        }
        let simple = alias
            .map(str::to_string)
            .unwrap_or_else(|| path.rsplit('.').next().unwrap_or(path).to_string());
        self.explicit.insert(simple, path.to_string());
    }

    /// Qualified names a simple name may refer to, most specific first
    pub fn candidates(&self, name: &str) -> Vec<String> {
        if let Some(qualified) = self.explicit.get(name) {
            return vec![qualified.clone()];
        }
        let mut out = Vec::with_capacity(self.stars.len() + 2);
        match &self.package {
            Some(package) => out.push(format!("{package}.{name}")),
            None => out.push(name.to_string()),
        }
        out.extend(self.stars.iter().map(|s| format!("{s}.{name}")));
        // default import
        out.push(format!("kotlin.{name}"));
        out
    }
}

/// A class-like declaration seen while scanning the project
#[derive(Debug, Clone, PartialEq)]
pub struct ClassHeader {
    pub qualified_name: String,
    pub kind: DeclarationKind,
    /// Supertypes as written, resolved later against the whole project
    pub supertypes: Vec<String>,
    pub imports: Imports,
}

#[derive(Debug, Clone, Default)]
struct ClassEntry {
    supertypes: Vec<String>,
}

/// Resolved knowledge about types, values and functions
#[derive(Debug, Clone)]
pub struct SymbolTable {
    classes: HashMap<String, ClassEntry>,
    /// Qualified value name to qualified type name
    values: HashMap<String, String>,
    /// Qualified function name to qualified return type
    functions: HashMap<String, String>,
    /// (owner type, member name) to qualified member type
    members: HashMap<(String, String), String>,
}

impl SymbolTable {
    /// Empty table, without the library symbols
    pub fn empty() -> Self {
        Self {
            classes: HashMap::new(),
            values: HashMap::new(),
            functions: HashMap::new(),
            members: HashMap::new(),
        }
    }

    /// Table preloaded with the coroutine and lifecycle symbols
    pub fn new() -> Self {
        let mut table = Self::empty();

        table.add_class(names::ANY, &[]);
        table.add_class(names::COROUTINE_CONTEXT, &[]);
        table.add_class(names::COROUTINE_CONTEXT_ELEMENT, &[names::COROUTINE_CONTEXT]);
        table.add_class(names::COROUTINE_SCOPE, &[]);
        table.add_class(names::GLOBAL_SCOPE, &[names::COROUTINE_SCOPE]);
        table.add_class(names::JOB, &[names::COROUTINE_CONTEXT_ELEMENT]);
        table.add_class(names::COMPLETABLE_JOB, &[names::JOB]);
        table.add_class(DEFERRED, &[names::JOB]);
        table.add_class(names::NON_CANCELLABLE, &[names::JOB]);
        table.add_class(names::COROUTINE_DISPATCHER, &[names::COROUTINE_CONTEXT_ELEMENT]);
        table.add_class(DISPATCHERS, &[]);
        table.add_class(names::VIEW_MODEL, &[]);
        table.add_class(names::ANDROID_VIEW_MODEL, &[names::VIEW_MODEL]);
        table.add_class(names::LIFECYCLE_COROUTINE_SCOPE, &[names::COROUTINE_SCOPE]);

        table.add_value(names::GLOBAL_SCOPE, names::GLOBAL_SCOPE);
        table.add_value(names::NON_CANCELLABLE, names::NON_CANCELLABLE);
        table.add_value(DISPATCHERS, DISPATCHERS);
        table.add_value("androidx.lifecycle.viewModelScope", names::COROUTINE_SCOPE);
        table.add_value("androidx.lifecycle.lifecycleScope", names::LIFECYCLE_COROUTINE_SCOPE);

        table.add_function("kotlinx.coroutines.Job", names::COMPLETABLE_JOB);
        table.add_function("kotlinx.coroutines.SupervisorJob", names::COMPLETABLE_JOB);

        for dispatcher in ["IO", "Main", "Default", "Unconfined"] {
            table.add_member(DISPATCHERS, dispatcher, names::COROUTINE_DISPATCHER);
        }
        table.add_member(names::COROUTINE_SCOPE, "launch", names::JOB);
        table.add_member(names::COROUTINE_SCOPE, "async", DEFERRED);

        table
    }

    pub fn add_class(&mut self, qualified: &str, supertypes: &[&str]) {
        self.classes.insert(
            qualified.to_string(),
            ClassEntry {
                supertypes: supertypes.iter().map(|s| s.to_string()).collect(),
            },
        );
    }

    pub fn add_value(&mut self, qualified: &str, ty: &str) {
        self.values.insert(qualified.to_string(), ty.to_string());
    }

    pub fn add_function(&mut self, qualified: &str, return_type: &str) {
        self.functions.insert(qualified.to_string(), return_type.to_string());
    }

    pub fn add_member(&mut self, owner: &str, member: &str, ty: &str) {
        self.members
            .insert((owner.to_string(), member.to_string()), ty.to_string());
    }

    /// Register the project's declarations; supertypes are resolved once all
    /// names are known so declaration order across files does not matter.
    pub fn register_project(&mut self, headers: &[ClassHeader]) {
        for header in headers {
            self.classes
                .entry(header.qualified_name.clone())
                .or_default();
            if header.kind == DeclarationKind::Object {
                self.add_value(&header.qualified_name, &header.qualified_name);
            }
        }
        for header in headers {
            let supertypes: Vec<String> = header
                .supertypes
                .iter()
                .filter_map(|raw| self.resolve_class(raw, &header.imports))
                .filter(|s| s != &header.qualified_name)
                .collect();
            if let Some(entry) = self.classes.get_mut(&header.qualified_name) {
                entry.supertypes = supertypes;
            }
        }
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Build the type for a known class, ancestors included
    pub fn type_of(&self, qualified: &str) -> Option<TypeRef> {
        let mut visiting = HashSet::new();
        self.build_type(qualified, &mut visiting)
    }

    fn build_type(&self, qualified: &str, visiting: &mut HashSet<String>) -> Option<TypeRef> {
        let entry = self.classes.get(qualified)?;
        if !visiting.insert(qualified.to_string()) {
            // inheritance cycle in broken code
            return Some(TypeRef::new(qualified));
        }
        let ancestors: Vec<TypeRef> = entry
            .supertypes
            .iter()
            .filter_map(|s| self.build_type(s, visiting))
            .collect();
        visiting.remove(qualified);
        Some(TypeRef::new(qualified).with_ancestors(ancestors))
    }

    /// Resolve a type name as written (`Job`, `CoroutineContext.Element`, `a.b.C`)
    pub fn resolve_class(&self, written: &str, imports: &Imports) -> Option<String> {
        if written.contains('.') && self.classes.contains_key(written) {
            return Some(written.to_string());
        }
        let (head, rest) = match written.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (written, None),
        };
        imports
            .candidates(head)
            .into_iter()
            .map(|c| match rest {
                Some(rest) => format!("{c}.{rest}"),
                None => c,
            })
            .find(|c| self.classes.contains_key(c))
    }

    pub fn resolve_type_annotation(&self, written: &str, imports: &Imports) -> Option<TypeRef> {
        self.resolve_class(written, imports)
            .and_then(|qualified| self.type_of(&qualified))
    }

    /// Type of a simple value name such as `GlobalScope` or `viewModelScope`
    pub fn resolve_value(&self, name: &str, imports: &Imports) -> Option<TypeRef> {
        imports
            .candidates(name)
            .iter()
            .find_map(|c| self.values.get(c))
            .and_then(|ty| self.type_of(ty))
    }

    /// Type of a fully-qualified value reference, e.g. `kotlinx.coroutines.GlobalScope`
    pub fn resolve_qualified_value(&self, path: &str) -> Option<TypeRef> {
        self.values.get(path).and_then(|ty| self.type_of(ty))
    }

    /// Return type of a receiver-less call: a known function or a constructor
    pub fn resolve_call(&self, name: &str, imports: &Imports) -> Option<TypeRef> {
        let candidates = imports.candidates(name);
        if let Some(ty) = candidates.iter().find_map(|c| self.functions.get(c)) {
            return self.type_of(ty);
        }
        self.resolve_class(name, imports)
            .and_then(|qualified| self.type_of(&qualified))
    }

    /// Return type of a fully-qualified call such as `kotlinx.coroutines.Job()`
    pub fn resolve_qualified_call(&self, path: &str) -> Option<TypeRef> {
        match self.functions.get(path) {
            Some(ty) => self.type_of(ty),
            None => self.type_of(path),
        }
    }

    /// Type of `receiver.member`, looking through the receiver's supertypes
    pub fn resolve_member(&self, receiver: &TypeRef, member: &str) -> Option<TypeRef> {
        let mut stack = vec![receiver];
        while let Some(ty) = stack.pop() {
            let key = (ty.qualified_name().to_string(), member.to_string());
            if let Some(found) = self.members.get(&key) {
                return self.type_of(found);
            }
            stack.extend(ty.ancestors());
        }
        None
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
