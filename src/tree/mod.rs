//! Source tree facade
//!
//! Read-only view over a parsed Kotlin file: call sites lowered to [`Node`]s,
//! the declarations that enclose them, and the project's resolved
//! dependencies. Detectors only ask bounded questions of this model; a missing
//! static type is always treated as "does not match".

mod location;
mod node;
mod types;

pub use location::{LineIndex, Location};
pub use node::{
    BinaryExpr, CallExpr, LiteralExpr, Node, NodeKind, ParenthesizedExpr, ReferenceExpr,
};
pub use types::{is_or_extends, names, TypeRef};

use std::collections::BTreeSet;
use std::path::PathBuf;

/// Kind of an enclosing declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Class,
    Object,
    Interface,
}

/// Index of a declaration inside its [`SourceFile`]
pub type DeclarationId = usize;

/// A class-like declaration that can enclose call sites
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    /// Resolved type of the declaration, including its supertypes
    pub ty: Option<TypeRef>,
    pub location: Location,
    /// Directly enclosing declaration, for nested classes
    pub parent: Option<DeclarationId>,
}

impl Declaration {
    pub fn is_or_extends(&self, candidate: &str) -> bool {
        is_or_extends(self.ty.as_ref(), candidate)
    }
}

/// A call visited by the host traversal
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    pub call: CallExpr,
    /// Innermost class-like declaration around the call
    pub enclosing: Option<DeclarationId>,
}

/// A parsed source file
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    pub declarations: Vec<Declaration>,
    pub call_sites: Vec<CallSite>,
}

impl SourceFile {
    pub fn new(path: PathBuf, text: String) -> Self {
        Self {
            path,
            text,
            declarations: Vec::new(),
            call_sites: Vec::new(),
        }
    }

    pub fn add_declaration(&mut self, declaration: Declaration) -> DeclarationId {
        self.declarations.push(declaration);
        self.declarations.len() - 1
    }

    pub fn add_call_site(&mut self, call: CallExpr, enclosing: Option<DeclarationId>) {
        self.call_sites.push(CallSite { call, enclosing });
    }

    pub fn declaration(&self, id: DeclarationId) -> Option<&Declaration> {
        self.declarations.get(id)
    }

    pub fn enclosing_declaration(&self, site: &CallSite) -> Option<&Declaration> {
        site.enclosing.and_then(|id| self.declaration(id))
    }
}

/// Artifacts (`group:artifact`) resolved into the project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    artifacts: BTreeSet<String>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coordinate; a trailing `:version` is dropped
    pub fn insert(&mut self, coordinate: &str) {
        let mut parts = coordinate.trim().split(':');
        if let (Some(group), Some(artifact)) = (parts.next(), parts.next()) {
            if !group.is_empty() && !artifact.is_empty() {
                self.artifacts.insert(format!("{}:{}", group, artifact));
            }
        }
    }

    pub fn contains(&self, artifact: &str) -> bool {
        self.artifacts.contains(artifact)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.artifacts.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for DependencySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = DependencySet::new();
        for coordinate in iter {
            set.insert(coordinate.as_ref());
        }
        set
    }
}

/// Free-function forms of the [`Node`] queries
pub fn kind_of(node: &Node) -> NodeKind {
    node.kind()
}

pub fn static_type_of(node: &Node) -> Option<&TypeRef> {
    node.static_type()
}

pub fn location_of(node: &Node) -> &Location {
    node.location()
}
