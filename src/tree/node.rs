//! Expression nodes lowered from the host tree
//!
//! Detectors match on the shapes exhaustively.

use super::{Location, TypeRef};

/// Discriminant of a [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Call,
    BinaryOp,
    Parenthesized,
    Reference,
    Literal,
}

/// An expression node with its source location
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Call(CallExpr),
    BinaryOp(BinaryExpr),
    Parenthesized(ParenthesizedExpr),
    Reference(ReferenceExpr),
    Literal(LiteralExpr),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Call(_) => NodeKind::Call,
            Node::BinaryOp(_) => NodeKind::BinaryOp,
            Node::Parenthesized(_) => NodeKind::Parenthesized,
            Node::Reference(_) => NodeKind::Reference,
            Node::Literal(_) => NodeKind::Literal,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Node::Call(call) => &call.location,
            Node::BinaryOp(binary) => &binary.location,
            Node::Parenthesized(paren) => &paren.location,
            Node::Reference(reference) => &reference.location,
            Node::Literal(literal) => &literal.location,
        }
    }

    /// Resolved static type, `None` when the host could not resolve it
    pub fn static_type(&self) -> Option<&TypeRef> {
        match self {
            Node::Call(call) => call.ty.as_ref(),
            Node::Reference(reference) => reference.ty.as_ref(),
            Node::Parenthesized(paren) => paren.inner.static_type(),
            Node::BinaryOp(_) | Node::Literal(_) => None,
        }
    }

    pub fn reference(name: impl Into<String>, ty: Option<TypeRef>, location: Location) -> Self {
        Node::Reference(ReferenceExpr {
            name: name.into(),
            ty,
            location,
        })
    }

    pub fn literal(text: impl Into<String>, location: Location) -> Self {
        Node::Literal(LiteralExpr {
            text: text.into(),
            location,
        })
    }

    pub fn binary(operator: impl Into<String>, left: Node, right: Node, location: Location) -> Self {
        Node::BinaryOp(BinaryExpr {
            operator: operator.into(),
            left: Box::new(left),
            right: Box::new(right),
            location,
        })
    }

    pub fn parenthesized(inner: Node, location: Location) -> Self {
        Node::Parenthesized(ParenthesizedExpr {
            inner: Box::new(inner),
            location,
        })
    }
}

/// A call such as `scope.launch(ctx) { }` or `SupervisorJob()`
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// Name of the called function as written
    pub callee: String,
    /// Span of the callee identifier
    pub callee_location: Location,
    /// Explicit receiver (`scope` in `scope.launch`)
    pub receiver: Option<Box<Node>>,
    /// Value arguments, the context argument first; trailing lambdas are not included
    pub arguments: Vec<Node>,
    /// Static type of the call result
    pub ty: Option<TypeRef>,
    /// Span of the whole call
    pub location: Location,
}

impl CallExpr {
    pub fn new(callee: impl Into<String>, callee_location: Location, location: Location) -> Self {
        Self {
            callee: callee.into(),
            callee_location,
            receiver: None,
            arguments: Vec::new(),
            ty: None,
            location,
        }
    }

    pub fn with_receiver(mut self, receiver: Node) -> Self {
        self.receiver = Some(Box::new(receiver));
        self
    }

    pub fn with_argument(mut self, argument: Node) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn receiver(&self) -> Option<&Node> {
        self.receiver.as_deref()
    }

    pub fn receiver_type(&self) -> Option<&TypeRef> {
        self.receiver().and_then(Node::static_type)
    }

    pub fn first_argument(&self) -> Option<&Node> {
        self.arguments.first()
    }

    pub fn into_node(self) -> Node {
        Node::Call(self)
    }
}

/// Binary composition, e.g. `SupervisorJob() + Dispatchers.IO`
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub operator: String,
    pub left: Box<Node>,
    pub right: Box<Node>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenthesizedExpr {
    pub inner: Box<Node>,
    pub location: Location,
}

/// Name or navigation chain, e.g. `job`, `Dispatchers.IO`
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceExpr {
    /// Source text of the reference
    pub name: String,
    pub ty: Option<TypeRef>,
    pub location: Location,
}

impl ReferenceExpr {
    /// A bare identifier with no qualifier
    pub fn is_simple_name(&self) -> bool {
        !self.name.is_empty() && self.name.chars().all(|c| c.is_alphanumeric() || c == '_')
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub text: String,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn loc(start: usize, end: usize) -> Location {
        Location::new(PathBuf::from("Test.kt"), 1, start + 1, start, end)
    }

    #[test]
    fn test_kind_and_location() {
        let node = Node::binary(
            "+",
            Node::reference("a", None, loc(0, 1)),
            Node::literal("1", loc(4, 5)),
            loc(0, 5),
        );
        assert_eq!(node.kind(), NodeKind::BinaryOp);
        assert_eq!(node.location().end_byte, 5);
        assert!(node.static_type().is_none());
    }

    #[test]
    fn test_parenthesized_type_is_inner_type() {
        let inner = Node::reference("job", Some(TypeRef::new("kotlinx.coroutines.Job")), loc(1, 4));
        let node = Node::parenthesized(inner, loc(0, 5));
        assert_eq!(
            node.static_type().map(TypeRef::qualified_name),
            Some("kotlinx.coroutines.Job")
        );
    }

    #[test]
    fn test_simple_name() {
        let simple = ReferenceExpr {
            name: "viewModelScope".into(),
            ty: None,
            location: loc(0, 14),
        };
        let qualified = ReferenceExpr {
            name: "this.viewModelScope".into(),
            ty: None,
            location: loc(0, 19),
        };
        assert!(simple.is_simple_name());
        assert!(!qualified.is_simple_name());
    }
}
