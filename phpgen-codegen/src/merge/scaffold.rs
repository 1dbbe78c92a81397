//! File-level scaffolding: the strict types marker and the namespace.

use phpgen_ast::{Ast, Expr, Node, NodeCategory, NodeKind};
use tracing::warn;

use crate::{MutationPass, Outcome, Result};

/// Adds `declare(strict_types=1);` as the first statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictTypesPass;

impl MutationPass for StrictTypesPass {
    fn name(&self) -> &'static str {
        "strict_types"
    }

    fn target(&self) -> String {
        "declare(strict_types=1)".into()
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        let root = ast.root();
        let declared = ast
            .find_child(root, |node| {
                matches!(&node.kind, NodeKind::Declare { key, .. } if key.eq_ignore_ascii_case("strict_types"))
            })
            .is_some();
        if declared {
            return Ok(Outcome::Unchanged);
        }

        let declare = ast.alloc(Node::new(NodeKind::Declare {
            key: "strict_types".into(),
            value: Expr::Int(1),
        }));
        ast.insert_child(root, 0, declare);
        Ok(Outcome::Inserted)
    }
}

/// Wraps the file in `namespace X;`, moving the existing top-level
/// statements (other than leading `declare`s) into it.
#[derive(Debug, Clone)]
pub struct NamespacePass {
    name: String,
}

impl NamespacePass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim_matches('\\').to_string(),
        }
    }
}

impl MutationPass for NamespacePass {
    fn name(&self) -> &'static str {
        "namespace"
    }

    fn target(&self) -> String {
        self.name.clone()
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        if let Some(existing) = ast.namespace() {
            let declared = ast.node(existing).name().unwrap_or_default();
            if !declared.eq_ignore_ascii_case(&self.name) {
                warn!(
                    declared,
                    requested = %self.name,
                    "file already declares another namespace; keeping it"
                );
            }
            return Ok(Outcome::Unchanged);
        }

        let root = ast.root();
        let statements = ast.take_children(root);
        let declares = statements
            .iter()
            .take_while(|&&id| ast.category(id) == NodeCategory::Declare)
            .count();
        let (head, body) = statements.split_at(declares);

        let mut namespace = Node::new(NodeKind::Namespace {
            name: self.name.clone(),
        });
        namespace.children = body.to_vec();
        let namespace = ast.alloc(namespace);

        ast.insert_children(root, 0, head.iter().copied());
        ast.push_child(root, namespace);
        Ok(Outcome::Inserted)
    }
}
