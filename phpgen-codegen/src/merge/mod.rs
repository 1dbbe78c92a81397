//! Merge engine: one pass per declaration element.
//!
//! Every pass checks the tree for the element it owns and inserts it only
//! when it is missing. Existing nodes are never replaced or removed, so
//! hand edits in a generated file survive regeneration.

mod declaration;
mod imports;
mod inheritance;
mod members;
mod scaffold;
mod traits;

pub use declaration::{ClassDeclarationPass, InterfaceDeclarationPass};
pub use imports::{Import, ImportsPass};
pub use inheritance::{ExtendsPass, ImplementsPass, InterfaceExtendsPass};
pub use members::{ConstantPass, MethodPass, PropertyPass};
pub use scaffold::{NamespacePass, StrictTypesPass};
pub use traits::TraitUsePass;

use phpgen_ast::{Ast, ClassDecl, InterfaceDecl, NodeCategory, NodeId, NodeKind};

use crate::{Error, Result, model::same_name};

/// Display name of a possibly anonymous class.
pub(crate) fn display_name(name: Option<&str>) -> &str {
    name.unwrap_or("class@anonymous")
}

fn missing(name: Option<&str>) -> Error {
    Error::MissingDeclaration {
        name: display_name(name).to_string(),
    }
}

/// The class or interface a member pass targets.
pub(crate) fn find_class_like(ast: &Ast, name: Option<&str>) -> Result<NodeId> {
    ast.find_class_like(name).ok_or_else(|| missing(name))
}

pub(crate) fn find_class(ast: &Ast, name: Option<&str>) -> Result<NodeId> {
    find_class_like(ast, name)
        .and_then(|id| match ast.category(id) {
            NodeCategory::Class => Ok(id),
            _ => Err(missing(name)),
        })
}

pub(crate) fn class_decl_mut<'a>(ast: &'a mut Ast, name: Option<&str>) -> Result<&'a mut ClassDecl> {
    let id = find_class_like(ast, name)?;
    match ast.kind_mut(id) {
        NodeKind::Class(decl) => Ok(decl),
        _ => Err(missing(name)),
    }
}

pub(crate) fn interface_decl_mut<'a>(ast: &'a mut Ast, name: &str) -> Result<&'a mut InterfaceDecl> {
    let id = find_class_like(ast, Some(name))?;
    match ast.kind_mut(id) {
        NodeKind::Interface(decl) => Ok(decl),
        _ => Err(missing(Some(name))),
    }
}

/// Names from `wanted` missing in `existing`, deduplicated, in order.
pub(crate) fn missing_names<'w>(existing: &[String], wanted: &'w [String]) -> Vec<&'w String> {
    let mut missing: Vec<&String> = Vec::new();
    for name in wanted {
        let known = existing
            .iter()
            .chain(missing.iter().copied())
            .any(|other| same_name(other, name));
        if !known {
            missing.push(name);
        }
    }
    missing
}

/// Where a new member of `category` goes in `parent`'s body.
///
/// Members are ranked trait use < constant < property < method. The new
/// member goes right after the last member of its own category, else right
/// after the last member of the nearest earlier category, else right before
/// the first member of a later category, else at the end. Hand-written
/// bodies in another order are handled by the same rule.
pub fn member_insert_index(ast: &Ast, parent: NodeId, category: NodeCategory) -> usize {
    let children = ast.children(parent);
    let Some(rank) = category.member_rank() else {
        return children.len();
    };
    let rank_of = |id: &NodeId| ast.category(*id).member_rank();

    if let Some(last) = children.iter().rposition(|id| rank_of(id) == Some(rank)) {
        return last + 1;
    }
    for earlier in (0..rank).rev() {
        if let Some(last) = children.iter().rposition(|id| rank_of(id) == Some(earlier)) {
            return last + 1;
        }
    }
    children
        .iter()
        .position(|id| rank_of(id).is_some_and(|r| r > rank))
        .unwrap_or(children.len())
}

#[cfg(test)]
pub(crate) mod test_support {
    use phpgen_ast::{Ast, Parser, PhpParser, PhpPrinter, Printer};

    use crate::{MutationPass, Outcome, Result};

    pub fn parse(source: &str) -> Ast {
        PhpParser::new().parse(source).unwrap()
    }

    pub fn print(ast: &Ast) -> String {
        PhpPrinter::default().print(ast)
    }

    /// Parse, apply once and print.
    pub fn apply(source: &str, pass: &dyn MutationPass) -> Result<(Outcome, String)> {
        let mut ast = parse(source);
        let outcome = pass.apply(&mut ast)?;
        Ok((outcome, print(&ast)))
    }
}

#[cfg(test)]
mod tests {
    use super::{test_support::parse, *};

    fn layout(source: &str) -> (Ast, NodeId) {
        let ast = parse(source);
        let class = ast.find_class_like(Some("Foo")).unwrap();
        (ast, class)
    }

    fn name_at(ast: &Ast, parent: NodeId, index: usize) -> String {
        let id = ast.children(parent)[index];
        match ast.kind(id) {
            NodeKind::TraitUse { traits, .. } => traits.join(","),
            kind => kind.name().unwrap_or_default().to_string(),
        }
    }

    #[test]
    fn test_canonical_layout() {
        let (ast, class) = layout(
            "<?php class Foo { use T; const C1 = 1; public $p1; function m1() {} }",
        );
        assert_eq!(member_insert_index(&ast, class, NodeCategory::TraitUse), 1);
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Constant), 2);
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Property), 3);
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Method), 4);
    }

    #[test]
    fn test_falls_back_to_earlier_category() {
        let (ast, class) = layout("<?php class Foo { use T; function m1() {} }");
        // no constants or properties: both go after the trait use
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Constant), 1);
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Property), 1);
    }

    #[test]
    fn test_goes_before_later_category_without_anchor() {
        let (ast, class) = layout("<?php class Foo { public $p1; function m1() {} }");
        assert_eq!(member_insert_index(&ast, class, NodeCategory::TraitUse), 0);
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Constant), 0);
    }

    #[test]
    fn test_empty_body() {
        let (ast, class) = layout("<?php class Foo {}");
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Method), 0);
    }

    #[test]
    fn test_interleaved_layout() {
        // hand-edited: method first, then a property, then a constant
        let (ast, class) = layout(
            "<?php class Foo { function m1() {} public $p1; const C1 = 1; }",
        );
        assert_eq!(name_at(&ast, class, 0), "m1");

        // same category present: right after its last member
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Method), 1);
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Property), 2);
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Constant), 3);
        // trait uses have no earlier anchor: before the first later member
        assert_eq!(member_insert_index(&ast, class, NodeCategory::TraitUse), 0);
    }

    #[test]
    fn test_interleaved_without_own_category() {
        // method before property, no constants: constants anchor on nothing
        // earlier and go before the method
        let (ast, class) = layout("<?php class Foo { function m1() {} public $p1; }");
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Constant), 0);
        // a trait use anchors a constant even when it sits at the end
        let (ast, class) = layout("<?php class Foo { function m1() {} use T; }");
        assert_eq!(member_insert_index(&ast, class, NodeCategory::Constant), 2);
    }

    #[test]
    fn test_missing_names() {
        let existing = vec!["\\Iterator".to_string()];
        let wanted = vec![
            "Iterator".to_string(),
            "Bar".to_string(),
            "\\Bar".to_string(),
        ];
        assert_eq!(missing_names(&existing, &wanted), vec!["Bar"]);
    }
}
