use phpgen_ast::{Ast, ClassDecl, InterfaceDecl, Modifiers, Node, NodeKind};

use super::display_name;
use crate::{
    MutationPass, Outcome, Result,
    model::{AttributeSpec, DocBlock, realize_attributes},
};

fn render_doc(comment: Option<&str>) -> Option<String> {
    comment.and_then(|comment| DocBlock::new().summary(comment).render())
}

/// Appends an empty class declaration to the scope when none with the
/// same name exists. Heritage and members come from later passes.
#[derive(Debug, Clone)]
pub struct ClassDeclarationPass {
    name: Option<String>,
    modifiers: Modifiers,
    doc_comment: Option<String>,
    attributes: Vec<AttributeSpec>,
}

impl ClassDeclarationPass {
    /// `None` declares an anonymous class.
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            modifiers: Modifiers::NONE,
            doc_comment: None,
            attributes: Vec::new(),
        }
    }

    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn doc(mut self, comment: Option<String>) -> Self {
        self.doc_comment = comment;
        self
    }

    pub fn attributes(mut self, attributes: Vec<AttributeSpec>) -> Self {
        self.attributes = attributes;
        self
    }
}

impl MutationPass for ClassDeclarationPass {
    fn name(&self) -> &'static str {
        "class"
    }

    fn target(&self) -> String {
        display_name(self.name.as_deref()).to_string()
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        if ast.find_class_like(self.name.as_deref()).is_some() {
            return Ok(Outcome::Unchanged);
        }
        let node = Node::new(NodeKind::Class(ClassDecl {
            name: self.name.clone(),
            modifiers: self.modifiers,
            extends: None,
            implements: Vec::new(),
        }))
        .with_doc(render_doc(self.doc_comment.as_deref()))
        .with_attributes(realize_attributes(&self.attributes)?);

        let scope = ast.scope();
        let class = ast.alloc(node);
        ast.push_child(scope, class);
        Ok(Outcome::Inserted)
    }
}

/// Appends an empty interface declaration to the scope when missing.
#[derive(Debug, Clone)]
pub struct InterfaceDeclarationPass {
    name: String,
    doc_comment: Option<String>,
    attributes: Vec<AttributeSpec>,
}

impl InterfaceDeclarationPass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc_comment: None,
            attributes: Vec::new(),
        }
    }

    pub fn doc(mut self, comment: Option<String>) -> Self {
        self.doc_comment = comment;
        self
    }

    pub fn attributes(mut self, attributes: Vec<AttributeSpec>) -> Self {
        self.attributes = attributes;
        self
    }
}

impl MutationPass for InterfaceDeclarationPass {
    fn name(&self) -> &'static str {
        "interface"
    }

    fn target(&self) -> String {
        self.name.clone()
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        if ast.find_class_like(Some(&self.name)).is_some() {
            return Ok(Outcome::Unchanged);
        }
        let node = Node::new(NodeKind::Interface(InterfaceDecl {
            name: self.name.clone(),
            extends: Vec::new(),
        }))
        .with_doc(render_doc(self.doc_comment.as_deref()))
        .with_attributes(realize_attributes(&self.attributes)?);

        let scope = ast.scope();
        let interface = ast.alloc(node);
        ast.push_child(scope, interface);
        Ok(Outcome::Inserted)
    }
}
