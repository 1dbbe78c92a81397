use phpgen_ast::{Ast, Node, NodeCategory, NodeKind};

use super::{display_name, find_class, missing_names};
use crate::{MutationPass, Outcome, Result};

/// Adds `use Trait;` statements for traits the class does not use yet.
///
/// Each new trait gets its own statement, prepended in reverse order at the
/// top of the body so they read in the given order.
#[derive(Debug, Clone)]
pub struct TraitUsePass {
    class: Option<String>,
    traits: Vec<String>,
}

impl TraitUsePass {
    pub fn new(class: Option<String>, traits: Vec<String>) -> Self {
        Self { class, traits }
    }
}

impl MutationPass for TraitUsePass {
    fn name(&self) -> &'static str {
        "trait_use"
    }

    fn target(&self) -> String {
        format!(
            "{} uses {}",
            display_name(self.class.as_deref()),
            self.traits.join(", ")
        )
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        let class = find_class(ast, self.class.as_deref())?;
        let used: Vec<String> = ast
            .children_of(class, NodeCategory::TraitUse)
            .flat_map(|id| match ast.kind(id) {
                NodeKind::TraitUse { traits, .. } => traits.clone(),
                _ => Vec::new(),
            })
            .collect();

        let missing: Vec<String> = missing_names(&used, &self.traits)
            .into_iter()
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        for name in missing.into_iter().rev() {
            let node = ast.alloc(Node::new(NodeKind::TraitUse {
                traits: vec![name],
                adaptations: None,
            }));
            ast.insert_child(class, 0, node);
        }
        Ok(Outcome::Inserted)
    }
}
