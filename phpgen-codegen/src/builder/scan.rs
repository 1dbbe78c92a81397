//! Reading a parsed file back into builder state.

use phpgen_ast::{Ast, Expr, Node, NodeCategory, NodeId, NodeKind};

use crate::{
    merge::Import,
    model::{AttributeSpec, ConstSpec, DocBlock, MethodSpec, PropertySpec, recover_attributes},
};

/// File-level facts around the first wanted declaration.
#[derive(Debug, Default)]
pub(crate) struct FileScan {
    pub strict: bool,
    pub namespace: Option<String>,
    /// Imports of the namespace block the declaration lives in.
    pub imports: Vec<Import>,
    declaration: Option<NodeId>,
}

impl FileScan {
    pub fn walk(ast: &Ast, nodes: &[NodeId], wanted: impl Fn(&Node) -> bool) -> Self {
        let mut scan = Self::default();
        scan.visit(ast, nodes, &wanted);
        scan
    }

    pub fn declaration(&self) -> Option<NodeId> {
        self.declaration
    }

    fn visit(&mut self, ast: &Ast, nodes: &[NodeId], wanted: &dyn Fn(&Node) -> bool) {
        for &id in nodes {
            if self.declaration.is_some() && ast.category(id) == NodeCategory::Namespace {
                break;
            }
            let node = ast.node(id);
            match &node.kind {
                NodeKind::File => self.visit(ast, &node.children, wanted),
                NodeKind::Declare { key, value } => {
                    if key.eq_ignore_ascii_case("strict_types") {
                        self.strict = matches!(value, Expr::Int(1));
                    }
                }
                NodeKind::Namespace { name } => {
                    self.namespace = (!name.is_empty()).then(|| name.clone());
                    self.imports.clear();
                    self.visit(ast, &node.children, wanted);
                }
                NodeKind::Use { name, alias } => self.imports.push(Import {
                    name: name.clone(),
                    alias: alias.clone(),
                }),
                NodeKind::Class(_) | NodeKind::Interface(_) => {
                    if self.declaration.is_none() && wanted(node) {
                        self.declaration = Some(id);
                    }
                }
                // members only matter inside the chosen declaration
                NodeKind::TraitUse { .. }
                | NodeKind::Constant(_)
                | NodeKind::Property(_)
                | NodeKind::Method(_)
                | NodeKind::Verbatim(_) => {}
            }
        }
    }
}

/// Body of a class or interface, in source order.
#[derive(Debug, Default)]
pub(crate) struct Members {
    pub traits: Vec<String>,
    pub constants: Vec<ConstSpec>,
    pub properties: Vec<PropertySpec>,
    pub methods: Vec<MethodSpec>,
}

impl Members {
    pub fn collect(ast: &Ast, declaration: NodeId) -> Self {
        let mut members = Self::default();
        for &id in ast.children(declaration) {
            let node = ast.node(id);
            match &node.kind {
                NodeKind::TraitUse { traits, .. } => members.traits.extend(traits.iter().cloned()),
                NodeKind::Constant(_) => members.constants.extend(ConstSpec::from_node(node)),
                NodeKind::Property(_) => members.properties.extend(PropertySpec::from_node(node)),
                NodeKind::Method(_) => members.methods.extend(MethodSpec::from_node(node)),
                NodeKind::Verbatim(_) => {}
                NodeKind::File
                | NodeKind::Declare { .. }
                | NodeKind::Namespace { .. }
                | NodeKind::Use { .. }
                | NodeKind::Class(_)
                | NodeKind::Interface(_) => {}
            }
        }
        members
    }

    /// Whether every member carries native types.
    pub fn typed(&self) -> bool {
        self.properties.iter().all(PropertySpec::is_typed)
            && self.methods.iter().all(MethodSpec::is_typed)
    }
}

/// Doc summary and attributes of a declaration node.
pub(crate) fn decoration(node: &Node) -> (Option<String>, Vec<AttributeSpec>) {
    let doc = node
        .doc
        .as_deref()
        .and_then(|doc| DocBlock::parse(doc).summary_text());
    (doc, recover_attributes(&node.attributes))
}
