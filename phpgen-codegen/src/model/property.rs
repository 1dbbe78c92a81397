use phpgen_ast::{Modifiers, Node, NodeKind, PropertyDecl};

use super::{AttributeSpec, DocBlock, TypeSpec, ValueSpec, attribute};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    name: String,
    ty: Option<TypeSpec>,
    default: Option<ValueSpec>,
    modifiers: Modifiers,
    typed: bool,
    doc_comment: Option<String>,
    doc_type: Option<String>,
    attributes: Vec<AttributeSpec>,
}

impl PropertySpec {
    /// A public, typed property named `name`, without the `$`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
            modifiers: Modifiers::PUBLIC,
            typed: true,
            doc_comment: None,
            doc_type: None,
            attributes: Vec::new(),
        }
    }

    pub fn ty(mut self, ty: TypeSpec) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn default(mut self, value: ValueSpec) -> Self {
        self.default = Some(value);
        self
    }

    pub fn public(self) -> Self {
        self.visibility(Modifiers::PUBLIC)
    }

    pub fn protected(self) -> Self {
        self.visibility(Modifiers::PROTECTED)
    }

    pub fn private(self) -> Self {
        self.visibility(Modifiers::PRIVATE)
    }

    fn visibility(mut self, visibility: Modifiers) -> Self {
        self.modifiers = self.modifiers.with_visibility(visibility);
        self
    }

    /// Add a flag such as [`Modifiers::STATIC`] or [`Modifiers::READONLY`].
    pub fn modifier(mut self, flag: Modifiers) -> Self {
        self.modifiers.insert(flag);
        self
    }

    /// Replace all modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// When false the type is only documented with `@var`.
    pub fn typed(mut self, typed: bool) -> Self {
        self.typed = typed;
        self
    }

    pub fn doc(mut self, comment: impl Into<String>) -> Self {
        self.doc_comment = Some(comment.into());
        self
    }

    /// Type shown in `@var` instead of the declared one.
    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn attribute(mut self, attribute: AttributeSpec) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_spec(&self) -> Option<&TypeSpec> {
        self.ty.as_ref()
    }

    pub fn default_value(&self) -> Option<&ValueSpec> {
        self.default.as_ref()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_typed(&self) -> bool {
        self.typed
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }

    fn doc_block(&self) -> DocBlock {
        let mut doc = DocBlock::new();
        if let Some(comment) = &self.doc_comment {
            doc = doc.summary(comment);
        }
        let var = match (&self.doc_type, &self.ty) {
            (Some(doc_type), _) => Some(doc_type.clone()),
            (None, Some(ty)) if !self.typed => Some(ty.doc_type()),
            _ => None,
        };
        match var {
            Some(var) => doc.tag("var", var),
            None => doc,
        }
    }

    pub fn to_node(&self) -> Result<Node> {
        let decl = PropertyDecl {
            name: self.name.clone(),
            modifiers: self.modifiers,
            ty: self.ty.as_ref().filter(|_| self.typed).map(TypeSpec::to_hint),
            default: self.default.as_ref().map(ValueSpec::materialize).transpose()?,
        };
        Ok(Node::new(NodeKind::Property(decl))
            .with_doc(self.doc_block().render())
            .with_attributes(attribute::realize_all(&self.attributes)?))
    }

    /// Rebuild from a property node; `None` for any other node.
    pub fn from_node(node: &Node) -> Option<Self> {
        let NodeKind::Property(decl) = &node.kind else {
            return None;
        };
        let doc = node.doc.as_deref().map(DocBlock::parse).unwrap_or_default();
        let var = doc.find_tag("var").map(str::to_string);

        let (ty, doc_type) = match (&decl.ty, var) {
            (Some(hint), var) => (Some(TypeSpec::from_hint(hint)), var),
            (None, Some(var)) => match TypeSpec::from_doc_type(&var) {
                Some(ty) => (Some(ty), None),
                None => (None, Some(var)),
            },
            (None, None) => (None, None),
        };

        Some(Self {
            name: decl.name.clone(),
            typed: decl.ty.is_some() || ty.is_none(),
            ty,
            default: decl.default.as_ref().map(ValueSpec::from_expr),
            modifiers: decl.modifiers,
            doc_comment: doc.summary_text(),
            doc_type,
            attributes: attribute::recover_all(&node.attributes),
        })
    }
}
