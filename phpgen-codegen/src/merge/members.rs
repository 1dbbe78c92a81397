use phpgen_ast::{Ast, Node, NodeCategory, NodeId, Parser};

use super::{display_name, find_class_like, member_insert_index};
use crate::{
    MutationPass, Outcome, Result,
    model::{ConstSpec, MethodSpec, PropertySpec},
};

/// Insert `node` into `class` at the member position for its category.
fn insert_member(ast: &mut Ast, class: NodeId, node: Node) -> Outcome {
    let index = member_insert_index(ast, class, node.category());
    let member = ast.alloc(node);
    ast.insert_child(class, index, member);
    Outcome::Inserted
}

fn has_member(
    ast: &Ast,
    class: NodeId,
    category: NodeCategory,
    matches: impl Fn(&str) -> bool,
) -> bool {
    ast.children_of(class, category)
        .any(|id| ast.node(id).name().is_some_and(&matches))
}

/// Adds a constant unless one with the same name exists.
#[derive(Debug, Clone)]
pub struct ConstantPass {
    class: Option<String>,
    spec: ConstSpec,
}

impl ConstantPass {
    pub fn new(class: Option<String>, spec: ConstSpec) -> Self {
        Self { class, spec }
    }
}

impl MutationPass for ConstantPass {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn target(&self) -> String {
        format!("{}::{}", display_name(self.class.as_deref()), self.spec.name())
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        let class = find_class_like(ast, self.class.as_deref())?;
        if has_member(ast, class, NodeCategory::Constant, |name| name == self.spec.name()) {
            return Ok(Outcome::Unchanged);
        }
        Ok(insert_member(ast, class, self.spec.to_node()?))
    }
}

/// Adds a property unless one with the same name exists.
#[derive(Debug, Clone)]
pub struct PropertyPass {
    class: Option<String>,
    spec: PropertySpec,
}

impl PropertyPass {
    pub fn new(class: Option<String>, spec: PropertySpec) -> Self {
        Self { class, spec }
    }
}

impl MutationPass for PropertyPass {
    fn name(&self) -> &'static str {
        "property"
    }

    fn target(&self) -> String {
        format!("{}::${}", display_name(self.class.as_deref()), self.spec.name())
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        let class = find_class_like(ast, self.class.as_deref())?;
        if has_member(ast, class, NodeCategory::Property, |name| name == self.spec.name()) {
            return Ok(Outcome::Unchanged);
        }
        Ok(insert_member(ast, class, self.spec.to_node()?))
    }
}

/// Adds a method unless one with the same (case-insensitive) name exists.
/// The body is parsed only when the method is actually inserted.
pub struct MethodPass<'p> {
    class: Option<String>,
    spec: MethodSpec,
    parser: &'p dyn Parser,
}

impl<'p> MethodPass<'p> {
    pub fn new(class: Option<String>, spec: MethodSpec, parser: &'p dyn Parser) -> Self {
        Self {
            class,
            spec,
            parser,
        }
    }
}

impl MutationPass for MethodPass<'_> {
    fn name(&self) -> &'static str {
        "method"
    }

    fn target(&self) -> String {
        format!("{}::{}()", display_name(self.class.as_deref()), self.spec.name())
    }

    fn apply(&self, ast: &mut Ast) -> Result<Outcome> {
        let class = find_class_like(ast, self.class.as_deref())?;
        let exists = has_member(ast, class, NodeCategory::Method, |name| {
            name.eq_ignore_ascii_case(self.spec.name())
        });
        if exists {
            return Ok(Outcome::Unchanged);
        }
        let in_interface = ast.category(class) == NodeCategory::Interface;
        let node = self.spec.to_node(self.parser, in_interface)?;
        Ok(insert_member(ast, class, node))
    }
}

#[cfg(test)]
mod tests {
    use phpgen_ast::PhpParser;

    use super::*;
    use crate::{
        Pipeline, ValueSpec,
        merge::test_support::{apply, parse, print},
    };

    fn class() -> Option<String> {
        Some("Foo".into())
    }

    #[test]
    fn test_constants_then_properties_keep_order() {
        let mut ast = parse("<?php\n\nclass Foo\n{\n}\n");
        let pipeline = Pipeline::new()
            .pass(ConstantPass::new(class(), ConstSpec::new("C1", ValueSpec::new(1))))
            .pass(PropertyPass::new(class(), PropertySpec::new("p1")))
            .pass(ConstantPass::new(class(), ConstSpec::new("C2", ValueSpec::new(2))))
            .pass(PropertyPass::new(class(), PropertySpec::new("p2")))
            .pass(ConstantPass::new(class(), ConstSpec::new("C3", ValueSpec::new(3))));
        pipeline.run(&mut ast).unwrap();
        insta::assert_snapshot!(print(&ast), @r"
<?php

class Foo
{
    public const C1 = 1;
    public const C2 = 2;
    public const C3 = 3;

    public $p1;

    public $p2;
}
");
    }

    #[test]
    fn test_existing_members_are_not_clobbered() {
        let source = "<?php\n\nclass Foo\n{\n    private const LIMIT = 5;\n\n    protected ?int $id = null;\n\n    public function getId(): ?int\n    {\n        return $this->id + 1;\n    }\n}\n";
        let parser = PhpParser::new();
        let passes: Vec<Box<dyn MutationPass + '_>> = vec![
            Box::new(ConstantPass::new(class(), ConstSpec::new("LIMIT", ValueSpec::new(10)))),
            Box::new(PropertyPass::new(
                class(),
                PropertySpec::new("id").ty("int".parse().unwrap()),
            )),
            Box::new(MethodPass::new(
                class(),
                MethodSpec::new("GETID").body("return $this->id;"),
                &parser,
            )),
        ];
        for pass in &passes {
            let (outcome, printed) = apply(source, pass.as_ref()).unwrap();
            assert_eq!(outcome, Outcome::Unchanged, "{}", pass.target());
            assert_eq!(printed, source);
        }
    }

    #[test]
    fn test_method_into_interface_has_no_body() {
        let parser = PhpParser::new();
        let pass = MethodPass::new(
            Some("Named".into()),
            MethodSpec::new("name").returns("string".parse().unwrap()),
            &parser,
        );
        let (_, printed) = apply("<?php\n\ninterface Named\n{\n}\n", &pass).unwrap();
        insta::assert_snapshot!(printed, @r"
<?php

interface Named
{
    public function name(): string;
}
");
    }

    #[test]
    fn test_method_goes_after_last_method() {
        let parser = PhpParser::new();
        let pass = MethodPass::new(class(), MethodSpec::new("second"), &parser);
        let source = "<?php\nclass Foo {\n    public function first() {}\n    public $late;\n}\n";
        let (_, printed) = apply(source, &pass).unwrap();
        insta::assert_snapshot!(printed, @r"
<?php

class Foo
{
    public function first()
    {
    }

    public function second()
    {
    }

    public $late;
}
");
    }

    #[test]
    fn test_member_pass_without_target_fails() {
        let pass = ConstantPass::new(Some("Missing".into()), ConstSpec::new("A", ValueSpec::new(1)));
        let err = apply("<?php\n", &pass).unwrap_err();
        assert_eq!(err.to_string(), "no class or interface named Missing in the file");
    }

    #[test]
    fn test_bad_value_surfaces_when_applied() {
        let pass = ConstantPass::new(
            class(),
            ConstSpec::new("RATIO", ValueSpec::float(f64::INFINITY)),
        );
        // building the pass is fine, realizing it is not
        assert!(apply("<?php\nclass Foo {}\n", &pass).is_err());
    }
}
