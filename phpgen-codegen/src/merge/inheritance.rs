use phpgen_ast::Ast;

use super::{class_decl_mut, display_name, interface_decl_mut, missing_names};
use crate::{Error, MutationPass, Outcome, Result, model::same_name};

/// Sets the parent class. A class that already extends something else is
/// a conflict: the pass will not rewrite an existing `extends`.
#[derive(Debug, Clone)]
pub struct ExtendsPass {
    class: Option<String>,
    parent: String,
}

impl ExtendsPass {
    pub fn new(class: Option<String>, parent: impl Into<String>) -> Self {
        Self {
            class,
            parent: parent.into(),
        }
    }
}

impl MutationPass for ExtendsPass {
    fn name(&self) -> &'static str {
        "extends"
    }

    fn target(&self) -> String {
        format!("{} extends {}", display_name(self.class.as_deref()), self.parent)
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        let decl = class_decl_mut(ast, self.class.as_deref())?;
        match decl.extends.as_deref() {
            None => {}
            Some(existing) if same_name(existing, &self.parent) => return Ok(Outcome::Unchanged),
            Some(existing) => {
                return Err(Error::InheritanceConflict {
                    class: display_name(self.class.as_deref()).to_string(),
                    existing: existing.to_string(),
                    requested: self.parent.clone(),
                });
            }
        }
        decl.extends = Some(self.parent.clone());
        Ok(Outcome::Inserted)
    }
}

/// Appends interfaces the class does not implement yet.
#[derive(Debug, Clone)]
pub struct ImplementsPass {
    class: Option<String>,
    interfaces: Vec<String>,
}

impl ImplementsPass {
    pub fn new(class: Option<String>, interfaces: Vec<String>) -> Self {
        Self { class, interfaces }
    }
}

impl MutationPass for ImplementsPass {
    fn name(&self) -> &'static str {
        "implements"
    }

    fn target(&self) -> String {
        format!(
            "{} implements {}",
            display_name(self.class.as_deref()),
            self.interfaces.join(", ")
        )
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        let decl = class_decl_mut(ast, self.class.as_deref())?;
        Ok(append(&mut decl.implements, &self.interfaces))
    }
}

/// Appends parent interfaces an interface does not extend yet.
#[derive(Debug, Clone)]
pub struct InterfaceExtendsPass {
    interface: String,
    parents: Vec<String>,
}

impl InterfaceExtendsPass {
    pub fn new(interface: impl Into<String>, parents: Vec<String>) -> Self {
        Self {
            interface: interface.into(),
            parents,
        }
    }
}

impl MutationPass for InterfaceExtendsPass {
    fn name(&self) -> &'static str {
        "interface_extends"
    }

    fn target(&self) -> String {
        format!("{} extends {}", self.interface, self.parents.join(", "))
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        let decl = interface_decl_mut(ast, &self.interface)?;
        Ok(append(&mut decl.extends, &self.parents))
    }
}

fn append(existing: &mut Vec<String>, wanted: &[String]) -> Outcome {
    let missing: Vec<String> = missing_names(existing, wanted)
        .into_iter()
        .cloned()
        .collect();
    if missing.is_empty() {
        return Outcome::Unchanged;
    }
    existing.extend(missing);
    Outcome::Inserted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::test_support::apply;

    const CLASS: &str = "<?php\n\nclass TestClass extends BaseClass implements \\Iterator\n{\n}\n";

    #[test]
    fn test_extends_sets_missing_parent() {
        let pass = ExtendsPass::new(Some("TestClass".into()), "BaseClass");
        let (outcome, printed) = apply("<?php\nclass TestClass {}\n", &pass).unwrap();
        assert_eq!(outcome, Outcome::Inserted);
        assert!(printed.contains("class TestClass extends BaseClass\n"));
    }

    #[test]
    fn test_same_parent_is_unchanged() {
        let pass = ExtendsPass::new(Some("TestClass".into()), "\\BaseClass");
        let (outcome, printed) = apply(CLASS, &pass).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(printed, CLASS);
    }

    #[test]
    fn test_different_parent_is_a_conflict() {
        let pass = ExtendsPass::new(Some("TestClass".into()), "OtherBase");
        let err = apply(CLASS, &pass).unwrap_err();
        assert_eq!(
            err.to_string(),
            "class TestClass already extends BaseClass, cannot extend OtherBase"
        );
    }

    #[test]
    fn test_extends_needs_a_class() {
        let pass = ExtendsPass::new(Some("Missing".into()), "Base");
        let err = apply(CLASS, &pass).unwrap_err();
        assert!(matches!(err, Error::MissingDeclaration { ref name } if name == "Missing"));
    }

    #[test]
    fn test_implements_appends_new_names() {
        let pass = ImplementsPass::new(
            Some("TestClass".into()),
            vec!["Iterator".into(), "Countable".into(), "\\Countable".into()],
        );
        let (outcome, printed) = apply(CLASS, &pass).unwrap();
        assert_eq!(outcome, Outcome::Inserted);
        assert!(printed.contains("class TestClass extends BaseClass implements \\Iterator, Countable\n"));

        let (outcome, _) = apply(&printed, &pass).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[test]
    fn test_interface_extends() {
        let pass = InterfaceExtendsPass::new("Repo", vec!["Countable".into(), "Traversable".into()]);
        let (outcome, printed) =
            apply("<?php\ninterface Repo extends Countable {}\n", &pass).unwrap();
        assert_eq!(outcome, Outcome::Inserted);
        assert!(printed.contains("interface Repo extends Countable, Traversable\n"));
    }
}
