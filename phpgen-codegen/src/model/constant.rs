use phpgen_ast::{ConstDecl, Modifiers, Node, NodeKind};

use super::{AttributeSpec, DocBlock, ValueSpec, attribute};
use crate::Result;

/// A class or interface constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstSpec {
    name: String,
    value: ValueSpec,
    modifiers: Modifiers,
    doc_comment: Option<String>,
    attributes: Vec<AttributeSpec>,
}

impl ConstSpec {
    pub fn new(name: impl Into<String>, value: ValueSpec) -> Self {
        Self {
            name: name.into(),
            value,
            modifiers: Modifiers::PUBLIC,
            doc_comment: None,
            attributes: Vec::new(),
        }
    }

    pub fn public(mut self) -> Self {
        self.modifiers = self.modifiers.with_visibility(Modifiers::PUBLIC);
        self
    }

    pub fn protected(mut self) -> Self {
        self.modifiers = self.modifiers.with_visibility(Modifiers::PROTECTED);
        self
    }

    pub fn private(mut self) -> Self {
        self.modifiers = self.modifiers.with_visibility(Modifiers::PRIVATE);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn doc(mut self, comment: impl Into<String>) -> Self {
        self.doc_comment = Some(comment.into());
        self
    }

    pub fn attribute(mut self, attribute: AttributeSpec) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ValueSpec {
        &self.value
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn to_node(&self) -> Result<Node> {
        let decl = ConstDecl {
            name: self.name.clone(),
            modifiers: self.modifiers,
            value: self.value.materialize()?,
        };
        let doc = self
            .doc_comment
            .as_deref()
            .and_then(|comment| DocBlock::new().summary(comment).render());
        Ok(Node::new(NodeKind::Constant(decl))
            .with_doc(doc)
            .with_attributes(attribute::realize_all(&self.attributes)?))
    }

    pub fn from_node(node: &Node) -> Option<Self> {
        let NodeKind::Constant(decl) = &node.kind else {
            return None;
        };
        Some(Self {
            name: decl.name.clone(),
            value: ValueSpec::from_expr(&decl.value),
            modifiers: decl.modifiers,
            doc_comment: node
                .doc
                .as_deref()
                .and_then(|doc| DocBlock::parse(doc).summary_text()),
            attributes: attribute::recover_all(&node.attributes),
        })
    }
}
