use phpgen_ast::{Ast, Node, NodeCategory, NodeKind};

use crate::{MutationPass, Outcome, Result, model::same_name};

/// `use Foo\Bar;` or `use Foo\Bar as Baz;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub name: String,
    pub alias: Option<String>,
}

impl Import {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim_start_matches('\\').to_string(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..Self::new(name)
        }
    }
}

/// Adds missing imports at the top of the current scope.
///
/// New imports are inserted in reverse order at a fixed position, so they
/// read in the given order above any imports already in the file.
#[derive(Debug, Clone)]
pub struct ImportsPass {
    imports: Vec<Import>,
}

impl ImportsPass {
    pub fn new(imports: impl IntoIterator<Item = Import>) -> Self {
        Self {
            imports: imports.into_iter().collect(),
        }
    }
}

impl MutationPass for ImportsPass {
    fn name(&self) -> &'static str {
        "imports"
    }

    fn target(&self) -> String {
        self.imports
            .iter()
            .map(|import| import.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        let scope = ast.scope();
        let existing: Vec<String> = ast
            .children_of(scope, NodeCategory::Use)
            .filter_map(|id| ast.node(id).name().map(str::to_string))
            .collect();

        let mut missing: Vec<&Import> = Vec::new();
        for import in &self.imports {
            let known = existing
                .iter()
                .map(String::as_str)
                .chain(missing.iter().map(|m| m.name.as_str()))
                .any(|name| same_name(name, &import.name));
            if !known {
                missing.push(import);
            }
        }
        if missing.is_empty() {
            return Ok(Outcome::Unchanged);
        }

        // declare statements only live at the file root
        let position = ast
            .children(scope)
            .iter()
            .take_while(|&&id| ast.category(id) == NodeCategory::Declare)
            .count();
        for import in missing.into_iter().rev() {
            let node = ast.alloc(Node::new(NodeKind::Use {
                name: import.name.clone(),
                alias: import.alias.clone(),
            }));
            ast.insert_child(scope, position, node);
        }
        Ok(Outcome::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::test_support::apply;

    #[test]
    fn test_new_imports_keep_caller_order() {
        let pass = ImportsPass::new([Import::new("\\Foo\\Bar"), Import::aliased("Baz\\Qux", "Q")]);
        let source = "<?php\nnamespace App;\n\nuse Existing\\One;\n\nclass A\n{\n}\n";
        let (outcome, printed) = apply(source, &pass).unwrap();
        assert_eq!(outcome, Outcome::Inserted);
        insta::assert_snapshot!(printed, @r"
<?php

namespace App;

use Foo\Bar;
use Baz\Qux as Q;
use Existing\One;

class A
{
}
");
    }

    #[test]
    fn test_imports_go_after_declare_without_namespace() {
        let pass = ImportsPass::new([Import::new("Foo\\Bar")]);
        let (_, printed) = apply("<?php\ndeclare(strict_types=1);\n", &pass).unwrap();
        insta::assert_snapshot!(printed, @r"
<?php

declare(strict_types=1);

use Foo\Bar;
");
    }

    #[test]
    fn test_present_imports_are_skipped() {
        let pass = ImportsPass::new([Import::new("foo\\bar"), Import::new("Foo\\Bar")]);
        let (outcome, printed) = apply("<?php\nuse \\Foo\\Bar;\n", &pass).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(printed.matches("use ").count(), 1);
    }
}
