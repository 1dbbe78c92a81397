//! Node shapes stored in the [`Ast`](crate::Ast) arena.

use crate::{Body, Expr, Modifiers, TypeHint};

/// Handle to a node inside an [`Ast`](crate::Ast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Closed set of node categories used for dispatch and member ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    File,
    Declare,
    Namespace,
    Use,
    Class,
    Interface,
    TraitUse,
    Constant,
    Property,
    Method,
    Verbatim,
}

impl NodeCategory {
    /// Position of a class-body member category in canonical layout.
    ///
    /// Trait uses come first, then constants, properties and methods.
    pub fn member_rank(self) -> Option<u8> {
        match self {
            Self::TraitUse => Some(0),
            Self::Constant => Some(1),
            Self::Property => Some(2),
            Self::Method => Some(3),
            _ => None,
        }
    }

    pub fn is_class_like(self) -> bool {
        matches!(self, Self::Class | Self::Interface)
    }
}

/// A PHP attribute: `#[Name(arg, ...)]`. Arguments are rendered source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub args: Vec<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// A function/method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeHint>,
    pub default: Option<Expr>,
    pub by_ref: bool,
    pub variadic: bool,
    /// Constructor promotion modifiers.
    pub modifiers: Modifiers,
    pub attributes: Vec<Attribute>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
            by_ref: false,
            variadic: false,
            modifiers: Modifiers::NONE,
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// `None` for an anonymous class.
    pub name: Option<String>,
    pub modifiers: Modifiers,
    pub extends: Option<String>,
    pub implements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: String,
    pub extends: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub ty: Option<TypeHint>,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub by_ref: bool,
    pub params: Vec<Param>,
    pub return_type: Option<TypeHint>,
    /// `None` for abstract and interface methods.
    pub body: Option<Body>,
}

/// The shape of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Root of every tree; children are top-level statements.
    File,
    /// `declare(strict_types=1);`
    Declare { key: String, value: Expr },
    /// `namespace Foo\Bar;` Children are the statements it governs.
    Namespace { name: String },
    /// `use Foo\Bar as Baz;`
    Use { name: String, alias: Option<String> },
    /// Children are class members.
    Class(ClassDecl),
    /// Children are interface members.
    Interface(InterfaceDecl),
    /// `use TraitA, TraitB;` inside a class body. The conflict resolution
    /// block of `use A, B { A::x insteadof B; }` is kept opaque.
    TraitUse {
        traits: Vec<String>,
        adaptations: Option<Body>,
    },
    Constant(ConstDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
    /// A construct outside the modeled subset, preserved as source text.
    Verbatim(String),
}

impl NodeKind {
    pub fn category(&self) -> NodeCategory {
        match self {
            Self::File => NodeCategory::File,
            Self::Declare { .. } => NodeCategory::Declare,
            Self::Namespace { .. } => NodeCategory::Namespace,
            Self::Use { .. } => NodeCategory::Use,
            Self::Class(_) => NodeCategory::Class,
            Self::Interface(_) => NodeCategory::Interface,
            Self::TraitUse { .. } => NodeCategory::TraitUse,
            Self::Constant(_) => NodeCategory::Constant,
            Self::Property(_) => NodeCategory::Property,
            Self::Method(_) => NodeCategory::Method,
            Self::Verbatim(_) => NodeCategory::Verbatim,
        }
    }

    /// The identity key of named nodes.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Namespace { name } | Self::Use { name, .. } => Some(name),
            Self::Class(decl) => decl.name.as_deref(),
            Self::Interface(decl) => Some(&decl.name),
            Self::Constant(decl) => Some(&decl.name),
            Self::Property(decl) => Some(&decl.name),
            Self::Method(decl) => Some(&decl.name),
            Self::File | Self::Declare { .. } | Self::TraitUse { .. } | Self::Verbatim(_) => None,
        }
    }
}

/// A node plus its children, doc comment and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    /// Doc comment in normalized form: one trimmed line per entry joined with
    /// `\n`, continuation lines prefixed with a single space.
    pub doc: Option<String>,
    pub attributes: Vec<Attribute>,
    /// Comments directly above the node, as written in the source.
    pub comment: Option<String>,
    /// Comment text following the node's last line, leading whitespace
    /// included.
    pub trailing_comment: Option<String>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            doc: None,
            attributes: Vec::new(),
            comment: None,
            trailing_comment: None,
        }
    }

    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn category(&self) -> NodeCategory {
        self.kind.category()
    }

    pub fn name(&self) -> Option<&str> {
        self.kind.name()
    }
}

/// Normalize a raw `/** ... */` comment into the form stored in [`Node::doc`].
pub fn normalize_doc(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .enumerate()
        .map(|(i, line)| {
            if i > 0 && line.starts_with('*') {
                format!(" {line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
