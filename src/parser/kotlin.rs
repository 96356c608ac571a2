//! Kotlin front end
//!
//! Parses Kotlin with tree-sitter and lowers it into the [`SourceFile`] facade
//! the detectors consume. Parsing happens twice per file: [`KotlinParser::outline`]
//! collects imports and class headers for the project-wide [`SymbolTable`], and
//! [`KotlinParser::parse`] lowers call sites with types resolved against it.

use super::symbols::{ClassHeader, Imports, SymbolTable};
use crate::error::{LintError, Result};
use crate::tree::{
    CallExpr, Declaration, DeclarationId, DeclarationKind, LineIndex, Location, Node, SourceFile,
    TypeRef,
};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node as SyntaxNode, Parser, Tree};

/// Parameter name of a builder's coroutine context
const CONTEXT_PARAMETER: &str = "context";

/// Imports and class-like declarations of one file
#[derive(Debug, Clone, Default)]
pub struct FileOutline {
    pub imports: Imports,
    pub classes: Vec<ClassHeader>,
}

/// Kotlin parser backed by tree-sitter-kotlin
pub struct KotlinParser;

impl KotlinParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_tree(&self, path: &Path, text: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_kotlin::language())
            .map_err(|e| LintError::Parse {
                path: path.to_path_buf(),
                message: format!("failed to load Kotlin grammar: {e}"),
            })?;
        let tree = parser.parse(text, None).ok_or_else(|| LintError::Parse {
            path: path.to_path_buf(),
            message: "parser produced no tree".to_string(),
        })?;
        if tree.root_node().has_error() {
            debug!("{}: syntax errors, analysing the recovered tree", path.display());
        }
        Ok(tree)
    }

    /// First pass: imports and class headers
    pub fn outline(&self, path: &Path, text: &str) -> Result<FileOutline> {
        let tree = self.parse_tree(path, text)?;
        let root = tree.root_node();
        let imports = read_imports(root, text);
        let mut classes = Vec::new();
        collect_headers(root, text, &imports, imports.package(), &mut classes);
        Ok(FileOutline { imports, classes })
    }

    /// Second pass: declarations and call sites with resolved types
    pub fn parse(&self, path: &Path, text: &str, table: &SymbolTable) -> Result<SourceFile> {
        let tree = self.parse_tree(path, text)?;
        let root = tree.root_node();
        let imports = read_imports(root, text);

        let mut lowering = Lowering {
            path,
            text,
            index: LineIndex::new(text),
            table,
            imports,
            scopes: Vec::new(),
            declarations: Vec::new(),
            qualifier: Vec::new(),
            file: SourceFile::new(path.to_path_buf(), text.to_string()),
        };

        let top_level = lowering.collect_scope(root);
        lowering.scopes.push(top_level);
        lowering.walk(root);
        Ok(lowering.file)
    }
}

impl Default for KotlinParser {
    fn default() -> Self {
        Self::new()
    }
}

fn text_of<'a>(node: SyntaxNode<'_>, text: &'a str) -> &'a str {
    node.utf8_text(text.as_bytes()).unwrap_or("")
}

/// Dotted name with whitespace and comments removed
fn dotted_text(node: SyntaxNode<'_>, text: &str) -> String {
    text_of(node, text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn children(node: SyntaxNode<'_>) -> Vec<SyntaxNode<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn named_children(node: SyntaxNode<'_>) -> Vec<SyntaxNode<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn child_of_kind<'t>(node: SyntaxNode<'t>, kind: &str) -> Option<SyntaxNode<'t>> {
    children(node).into_iter().find(|c| c.kind() == kind)
}

/// Name of a `name = value` argument
fn argument_name(argument: SyntaxNode<'_>, text: &str) -> Option<String> {
    if !children(argument).iter().any(|c| c.kind() == "=") {
        return None;
    }
    child_of_kind(argument, "simple_identifier").map(|name| text_of(name, text).to_string())
}

fn is_class_like(kind: &str) -> bool {
    matches!(kind, "class_declaration" | "object_declaration" | "companion_object")
}

fn read_imports(root: SyntaxNode<'_>, text: &str) -> Imports {
    let package = child_of_kind(root, "package_header")
        .and_then(|header| child_of_kind(header, "identifier"))
        .map(|id| dotted_text(id, text));
    let mut imports = Imports::new(package);

    let mut headers = Vec::new();
    for child in children(root) {
        match child.kind() {
            "import_list" => headers.extend(
                children(child)
                    .into_iter()
                    .filter(|c| c.kind() == "import_header"),
            ),
            "import_header" => headers.push(child),
            _ => {}
        }
    }

    for header in headers {
        let Some(identifier) = child_of_kind(header, "identifier") else {
            continue;
        };
        let mut path = dotted_text(identifier, text);
        let wildcard = child_of_kind(header, "wildcard_import").is_some()
            || text_of(header, text)
                .trim_end()
                .trim_end_matches(';')
                .trim_end()
                .ends_with('*');
        if wildcard {
            path.push_str(".*");
        }
        let alias = child_of_kind(header, "import_alias")
            .and_then(|a| named_children(a).into_iter().last())
            .map(|n| text_of(n, text).to_string());
        imports.add(&path, alias.as_deref());
    }
    imports
}

fn declaration_kind(node: SyntaxNode<'_>) -> DeclarationKind {
    match node.kind() {
        "object_declaration" | "companion_object" => DeclarationKind::Object,
        _ if children(node).iter().any(|c| c.kind() == "interface") => DeclarationKind::Interface,
        _ => DeclarationKind::Class,
    }
}

fn declaration_name<'t>(node: SyntaxNode<'t>, text: &str) -> (String, Option<SyntaxNode<'t>>) {
    match child_of_kind(node, "type_identifier").or_else(|| child_of_kind(node, "simple_identifier")) {
        Some(name) => (text_of(name, text).to_string(), Some(name)),
        None => ("Companion".to_string(), None),
    }
}

/// Name of a `user_type`, type arguments stripped: `kotlinx.coroutines.Job`
fn user_type_name(node: SyntaxNode<'_>, text: &str) -> Option<String> {
    match node.kind() {
        "user_type" => {
            let parts: Vec<&str> = children(node)
                .into_iter()
                .filter(|c| c.kind() == "simple_user_type")
                .filter_map(|s| named_children(s).into_iter().next())
                .map(|id| text_of(id, text))
                .collect();
            if parts.is_empty() {
                Some(dotted_text(node, text))
            } else {
                Some(parts.join("."))
            }
        }
        "nullable_type" | "parenthesized_type" | "type_reference" | "constructor_invocation"
        | "delegation_specifier" | "annotated_delegation_specifier" | "explicit_delegation" => {
            named_children(node)
                .into_iter()
                .find_map(|c| user_type_name(c, text))
        }
        _ => None,
    }
}

/// Supertypes written after `:` in a class header
fn supertype_names(node: SyntaxNode<'_>, text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for child in children(node) {
        match child.kind() {
            "delegation_specifier" | "annotated_delegation_specifier" => {
                out.extend(user_type_name(child, text));
            }
            "delegation_specifiers" => out.extend(supertype_names(child, text)),
            _ => {}
        }
    }
    out
}

fn qualify(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}.{name}"),
        None => name.to_string(),
    }
}

fn collect_headers(
    node: SyntaxNode<'_>,
    text: &str,
    imports: &Imports,
    prefix: Option<&str>,
    out: &mut Vec<ClassHeader>,
) {
    for child in children(node) {
        if is_class_like(child.kind()) {
            let (name, _) = declaration_name(child, text);
            let qualified = qualify(prefix, &name);
            out.push(ClassHeader {
                qualified_name: qualified.clone(),
                kind: declaration_kind(child),
                supertypes: supertype_names(child, text),
                imports: imports.clone(),
            });
            collect_headers(child, text, imports, Some(&qualified), out);
        } else {
            collect_headers(child, text, imports, prefix, out);
        }
    }
}

/// Per-file lowering state
struct Lowering<'a> {
    path: &'a Path,
    text: &'a str,
    index: LineIndex,
    table: &'a SymbolTable,
    imports: Imports,
    /// Typed properties and constructor parameters, innermost last
    scopes: Vec<HashMap<String, TypeRef>>,
    declarations: Vec<DeclarationId>,
    qualifier: Vec<String>,
    file: SourceFile,
}

impl<'a> Lowering<'a> {
    fn location(&self, node: SyntaxNode<'_>) -> Location {
        self.index.location(self.path, node.start_byte(), node.end_byte())
    }

    fn text(&self, node: SyntaxNode<'_>) -> &'a str {
        text_of(node, self.text)
    }

    fn current_declaration(&self) -> Option<DeclarationId> {
        self.declarations.last().copied()
    }

    fn walk(&mut self, node: SyntaxNode<'_>) {
        if is_class_like(node.kind()) {
            self.enter_declaration(node);
            return;
        }
        if node.kind() == "call_expression" {
            let call = self.lower_call(node);
            let enclosing = self.current_declaration();
            self.file.add_call_site(call, enclosing);
        }
        for child in children(node) {
            self.walk(child);
        }
    }

    fn enter_declaration(&mut self, node: SyntaxNode<'_>) {
        let (name, name_node) = declaration_name(node, self.text);
        let prefix = match self.qualifier.last() {
            Some(outer) => Some(outer.clone()),
            None => self.imports.package().map(str::to_string),
        };
        let qualified = qualify(prefix.as_deref(), &name);
        let ty = self
            .table
            .type_of(&qualified)
            .unwrap_or_else(|| TypeRef::new(qualified.clone()));

        let id = self.file.add_declaration(Declaration {
            name,
            kind: declaration_kind(node),
            ty: Some(ty),
            location: self.location(name_node.unwrap_or(node)),
            parent: self.current_declaration(),
        });

        let scope = self.collect_scope(node);
        self.declarations.push(id);
        self.qualifier.push(qualified);
        self.scopes.push(scope);
        for child in children(node) {
            self.walk(child);
        }
        self.scopes.pop();
        self.qualifier.pop();
        self.declarations.pop();
    }

    /// Typed names visible in a class body (or at top level)
    fn collect_scope(&mut self, node: SyntaxNode<'_>) -> HashMap<String, TypeRef> {
        let mut scope = HashMap::new();

        if let Some(constructor) = child_of_kind(node, "primary_constructor") {
            let parameters = child_of_kind(constructor, "class_parameters")
                .map(children)
                .unwrap_or_default();
            for parameter in parameters.into_iter().filter(|p| p.kind() == "class_parameter") {
                let name = child_of_kind(parameter, "simple_identifier").map(|n| self.text(n));
                let ty = named_children(parameter)
                    .into_iter()
                    .find_map(|c| user_type_name(c, self.text))
                    .and_then(|written| self.table.resolve_type_annotation(&written, &self.imports));
                if let (Some(name), Some(ty)) = (name, ty) {
                    scope.insert(name.to_string(), ty);
                }
            }
        }

        let body_members = match child_of_kind(node, "class_body")
            .or_else(|| child_of_kind(node, "enum_class_body"))
        {
            Some(body) => children(body),
            None if node.kind() == "source_file" => children(node),
            None => Vec::new(),
        };
        for member in body_members.into_iter().filter(|m| m.kind() == "property_declaration") {
            if let Some((name, ty)) = self.property_type(member) {
                scope.insert(name, ty);
            }
        }
        scope
    }

    /// `val name: Type` or `val name = initializer`
    fn property_type(&mut self, property: SyntaxNode<'_>) -> Option<(String, TypeRef)> {
        let variable = child_of_kind(property, "variable_declaration")?;
        let name = self.text(child_of_kind(variable, "simple_identifier")?).to_string();

        let annotated = named_children(variable)
            .into_iter()
            .find_map(|c| user_type_name(c, self.text))
            .and_then(|written| self.table.resolve_type_annotation(&written, &self.imports));
        if annotated.is_some() {
            return annotated.map(|ty| (name, ty));
        }

        let mut after_equals = false;
        for child in children(property) {
            if after_equals && child.is_named() {
                let ty = self.lower(child).static_type().cloned()?;
                return Some((name, ty));
            }
            after_equals |= child.kind() == "=";
        }
        None
    }

    fn lookup_local(&self, name: &str) -> Option<TypeRef> {
        self.scopes.iter().rev().find_map(|s| s.get(name)).cloned()
    }

    fn lower(&mut self, node: SyntaxNode<'_>) -> Node {
        let location = self.location(node);
        match node.kind() {
            "parenthesized_expression" => match named_children(node).into_iter().next() {
                Some(inner) => Node::parenthesized(self.lower(inner), location),
                None => Node::reference(self.text(node), None, location),
            },
            "additive_expression" => {
                let parts = children(node);
                let named: Vec<_> = parts.iter().filter(|c| c.is_named()).copied().collect();
                let operator = parts
                    .iter()
                    .find(|c| !c.is_named())
                    .map(|c| self.text(*c))
                    .unwrap_or("+");
                match named.as_slice() {
                    [left, right] => {
                        let left = self.lower(*left);
                        let right = self.lower(*right);
                        Node::binary(operator, left, right, location)
                    }
                    _ => Node::reference(self.text(node), None, location),
                }
            }
            "call_expression" => self.lower_call(node).into_node(),
            "simple_identifier" => {
                let name = self.text(node);
                let ty = self
                    .lookup_local(name)
                    .or_else(|| self.table.resolve_value(name, &self.imports));
                Node::reference(name, ty, location)
            }
            "navigation_expression" => {
                let ty = self.resolve_navigation(node);
                Node::reference(dotted_text(node, self.text), ty, location)
            }
            kind if kind.ends_with("_literal") || kind == "null" => {
                Node::literal(self.text(node), location)
            }
            _ => Node::reference(self.text(node), None, location),
        }
    }

    /// Type of `a.b.c` used as a value
    fn resolve_navigation(&mut self, node: SyntaxNode<'_>) -> Option<TypeRef> {
        let full = dotted_text(node, self.text);
        if let Some(ty) = self.table.resolve_qualified_value(&full) {
            return Some(ty);
        }
        let (receiver, member) = self.split_navigation(node)?;
        let member = self.text(member).to_string();
        if receiver.kind() == "this_expression" {
            return self.lookup_local(&member);
        }
        let receiver_ty = self.lower(receiver).static_type().cloned()?;
        self.table.resolve_member(&receiver_ty, &member)
    }

    /// Receiver expression and member identifier of a navigation
    fn split_navigation<'t>(
        &self,
        node: SyntaxNode<'t>,
    ) -> Option<(SyntaxNode<'t>, SyntaxNode<'t>)> {
        let named = named_children(node);
        let receiver = *named.first()?;
        let suffix = named.iter().rev().find(|c| c.kind() == "navigation_suffix")?;
        let member = child_of_kind(*suffix, "simple_identifier")?;
        Some((receiver, member))
    }

    fn lower_call(&mut self, node: SyntaxNode<'_>) -> CallExpr {
        let location = self.location(node);
        let named = named_children(node);
        let callee_node = named.first().copied();
        let suffix = named.iter().copied().find(|c| c.kind() == "call_suffix");

        let (callee, callee_location, receiver, ty) = match callee_node {
            Some(callee) if callee.kind() == "navigation_expression" => {
                match self.split_navigation(callee) {
                    Some((receiver_node, member)) => {
                        let name = self.text(member).to_string();
                        let receiver = self.lower(receiver_node);
                        let qualified = format!("{}.{}", dotted_text(receiver_node, self.text), name);
                        let ty = match receiver.static_type() {
                            Some(receiver_ty) => self.table.resolve_member(receiver_ty, &name),
                            None => self.table.resolve_qualified_call(&qualified),
                        };
                        (name, self.location(member), Some(receiver), ty)
                    }
                    None => (
                        self.text(callee).to_string(),
                        self.location(callee),
                        None,
                        None,
                    ),
                }
            }
            Some(callee) => {
                let name = self.text(callee).to_string();
                let ty = if callee.kind() == "simple_identifier" {
                    self.table.resolve_call(&name, &self.imports)
                } else {
                    None
                };
                (name, self.location(callee), None, ty)
            }
            None => (String::new(), location.clone(), None, None),
        };

        let mut call = CallExpr::new(callee, callee_location, location);
        if let Some(receiver) = receiver {
            call = call.with_receiver(receiver);
        }
        if let Some(ty) = ty {
            call = call.with_type(ty);
        }

        let arguments = suffix
            .and_then(|s| child_of_kind(s, "value_arguments"))
            .map(children)
            .unwrap_or_default();
        let mut lowered: Vec<(Option<String>, Node)> = Vec::new();
        for argument in arguments.into_iter().filter(|a| a.kind() == "value_argument") {
            // named arguments put the expression last
            if let Some(expression) = named_children(argument).into_iter().last() {
                lowered.push((argument_name(argument, self.text), self.lower(expression)));
            }
        }

        // context first: the argument named `context`, else the first positional one
        let context = lowered
            .iter()
            .position(|(name, _)| name.as_deref() == Some(CONTEXT_PARAMETER))
            .or_else(|| lowered.iter().position(|(name, _)| name.is_none()));
        if let Some(index) = context.filter(|&index| index > 0) {
            let argument = lowered.remove(index);
            lowered.insert(0, argument);
        }
        for (_, argument) in lowered {
            call = call.with_argument(argument);
        }
        call
    }
}
