//! Arena storage for syntax trees.

use crate::{Node, NodeCategory, NodeId, NodeKind};

/// A syntax tree whose nodes live in a flat arena and are addressed by
/// [`NodeId`].
///
/// Splicing a child list is a local `Vec` operation on the parent. Nodes that
/// get detached stay in the arena but are unreachable from the root.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Create an empty file.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::File)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Store a node and return its handle. The node is not attached anywhere.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub fn category(&self, id: NodeId) -> NodeCategory {
        self.nodes[id.0].category()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Insert `child` under `parent` at `index` (clamped to the child count).
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Insert several children starting at `index`, keeping their order.
    pub fn insert_children(
        &mut self,
        parent: NodeId,
        index: usize,
        new_children: impl IntoIterator<Item = NodeId>,
    ) {
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.splice(index..index, new_children);
    }

    pub fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// Detach and return every child of `parent`.
    pub fn take_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        std::mem::take(&mut self.nodes[parent.0].children)
    }

    pub fn position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// First direct child of `parent` matching `pred`.
    pub fn find_child(&self, parent: NodeId, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&id| pred(self.node(id)))
    }

    /// Direct children of `parent` in the given category.
    pub fn children_of(
        &self,
        parent: NodeId,
        category: NodeCategory,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent)
            .iter()
            .copied()
            .filter(move |&id| self.category(id) == category)
    }

    /// Whether the file has no statements at all.
    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    /// The first namespace declared at file level.
    pub fn namespace(&self) -> Option<NodeId> {
        self.find_child(self.root, |node| {
            node.category() == NodeCategory::Namespace
        })
    }

    /// The node whose children are the file's statements: the namespace when
    /// one is declared, otherwise the root.
    pub fn scope(&self) -> NodeId {
        self.namespace().unwrap_or(self.root)
    }

    /// Find a class or interface in the statement scope.
    ///
    /// Names compare case-insensitively, like PHP class names. `None` looks up
    /// the first anonymous class.
    pub fn find_class_like(&self, name: Option<&str>) -> Option<NodeId> {
        let scope = self.scope();
        self.find_child(scope, |node| match (&node.kind, name) {
            (NodeKind::Class(decl), None) => decl.name.is_none(),
            (NodeKind::Class(_) | NodeKind::Interface(_), Some(wanted)) => node
                .name()
                .is_some_and(|found| found.eq_ignore_ascii_case(wanted)),
            _ => false,
        })
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}
