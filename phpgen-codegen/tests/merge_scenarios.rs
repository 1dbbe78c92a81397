//! End-to-end merge scenarios: builders realized against empty files,
//! against their own output, and against hand-edited sources.

use phpgen_ast::{Parser, PhpParser, PhpPrinter, Printer};
use phpgen_codegen::{
    ClassBuilder, ConstSpec, Error, FileSpec, Import, MethodSpec, Pipeline, PropertySpec,
    ValueSpec,
};

fn realize(item: &impl FileSpec, source: &str) -> phpgen_codegen::Result<String> {
    let parser = PhpParser::new();
    let mut ast = parser.parse(source)?;
    let mut pipeline = Pipeline::new();
    item.inject_visitors(&mut pipeline, &parser);
    pipeline.run(&mut ast)?;
    Ok(PhpPrinter::default().print(&ast))
}

fn test_class() -> ClassBuilder {
    let mut class = ClassBuilder::from_scratch("TestClass");
    class
        .set_namespace("My\\Awesome\\Service")
        .set_final(true)
        .set_extends("BaseClass")
        .add_import(Import::new("Foo\\Bar"))
        .add_implements("\\Iterator")
        .add_implements("Bar")
        .add_trait("\\My\\TestTrait")
        .add_constant(ConstSpec::new("PRIV", ValueSpec::new("private")).private());
    class
}

/// A fully described class prints every element exactly once, and printing
/// it again over its own output changes nothing.
#[test]
fn test_class_from_scratch_is_idempotent() {
    let class = test_class();
    let first = realize(&class, "").expect("Failed to realize class");

    insta::assert_snapshot!(first, @r"
<?php

declare(strict_types=1);

namespace My\Awesome\Service;

use Foo\Bar;

final class TestClass extends BaseClass implements \Iterator, Bar
{
    use \My\TestTrait;

    private const PRIV = 'private';
}
");

    let second = realize(&class, &first).expect("Failed to realize class over its output");
    assert_eq!(first, second);
    assert_eq!(second.matches("namespace ").count(), 1);
    assert_eq!(second.matches("use Foo\\Bar;").count(), 1);
    assert_eq!(second.matches("class TestClass").count(), 1);
}

/// Reading printed output back gives the builder that produced it.
#[test]
fn test_round_trip_through_source() {
    let mut class = test_class();
    class
        .add_property(PropertySpec::new("items").private().ty("array".parse().unwrap()))
        .add_method(
            MethodSpec::new("current")
                .returns("mixed".parse().unwrap())
                .body("return current($this->items);"),
        );

    let printed = realize(&class, "").expect("Failed to realize class");
    let ast = PhpParser::new().parse(&printed).expect("Failed to parse output");
    let recovered = ClassBuilder::from_ast(&ast).expect("Failed to read class back");

    assert_eq!(recovered, class);
}

/// Members already present in the file keep their hand-written content.
#[test]
fn test_existing_members_are_not_clobbered() {
    let source = r#"<?php

namespace My\Awesome\Service;

final class TestClass extends BaseClass
{
    private const PRIV = 'edited by hand';

    public function current(): mixed
    {
        // custom
        return null;
    }
}
"#;
    let mut class = test_class();
    class.add_method(MethodSpec::new("current").body("return 1;"));

    let output = realize(&class, source).expect("Failed to merge into existing file");
    assert!(output.contains("private const PRIV = 'edited by hand';"));
    assert!(output.contains("// custom"));
    assert!(!output.contains("return 1;"));
    assert!(output.contains("use \\My\\TestTrait;"));
    assert!(output.contains("implements \\Iterator, Bar"));
}

/// New members land after the last member of their kind, so a constant
/// added later follows the earlier ones and precedes the properties.
#[test]
fn test_members_added_later_keep_grouping() {
    let mut class = ClassBuilder::from_scratch("Order");
    class
        .add_constant(ConstSpec::new("C1", ValueSpec::new(1)))
        .add_constant(ConstSpec::new("C2", ValueSpec::new(2)))
        .add_property(PropertySpec::new("p1"))
        .add_property(PropertySpec::new("p2"));
    let first = realize(&class, "").expect("Failed to realize class");

    class.add_constant(ConstSpec::new("C3", ValueSpec::new(3)));
    let second = realize(&class, &first).expect("Failed to merge new constant");

    let position = |needle: &str| {
        second
            .find(needle)
            .unwrap_or_else(|| panic!("missing {needle} in:\n{second}"))
    };
    assert!(position("C1") < position("C2"));
    assert!(position("C2") < position("C3"));
    assert!(position("C3") < position("$p1"));
    assert!(position("$p1") < position("$p2"));
}

/// A file that already extends another parent is reported, not rewritten;
/// the same parent written differently is accepted.
#[test]
fn test_inheritance_conflict() {
    let source = "<?php\n\nclass Child extends Other\n{\n}\n";
    let mut class = ClassBuilder::from_scratch("Child");
    class.set_extends("Base");

    let err = realize(&class, source).unwrap_err();
    assert!(matches!(err, Error::InheritanceConflict { .. }));
    assert_eq!(
        err.to_string(),
        "class Child already extends Other, cannot extend Base"
    );

    class.set_extends("\\other");
    let output = realize(&class, source).expect("Failed to accept the same parent");
    assert!(output.contains("class Child extends Other"));

    class.set_extends("Base");
    let once = realize(&class, "").expect("Failed to realize class");
    let twice = realize(&class, &once).expect("Failed to realize class twice");
    assert_eq!(once, twice);
}

/// Plain comments at file, namespace and class level are printed back
/// exactly where they were written.
#[test]
fn test_hand_comments_survive_realization() {
    let source = r#"<?php

// file note

namespace App;

// keep me
class Foo
{
    # hash note

    public function bar(): void
    {
    }
    // after bar
}
"#;
    let mut class = ClassBuilder::from_scratch("Foo");
    class.set_namespace("App").set_strict(false);

    let output = realize(&class, source).expect("Failed to realize class");
    assert_eq!(output, source);

    class.add_method(MethodSpec::new("baz").body("return;"));
    let output = realize(&class, source).expect("Failed to add a method");
    assert!(output.contains("// file note\n\nnamespace App;"));
    assert!(output.contains("// keep me\nclass Foo"));
    assert!(output.contains("    # hash note\n"));
    assert!(output.contains("    }\n    // after bar\n\n    public function baz()"));
}

/// Traits named in a `use` with a conflict resolution block count as used.
#[test]
fn test_trait_use_with_adaptations_is_not_duplicated() {
    let source = r#"<?php

class Foo
{
    use A, B {
        A::x insteadof B;
    }
}
"#;
    let mut class = ClassBuilder::from_scratch("Foo");
    class.set_strict(false).add_trait("B").add_trait("C");

    let output = realize(&class, source).expect("Failed to realize class");
    insta::assert_snapshot!(output, @r"
<?php

class Foo
{
    use C;
    use A, B {
        A::x insteadof B;
    }
}
");
    assert!(!output.contains("use B;"));
    let again = realize(&class, &output).expect("Failed to realize class again");
    assert_eq!(again, output);
}

/// A heredoc closed at column 0 inside an existing method keeps its
/// columns when the file is merged.
#[test]
fn test_heredoc_in_existing_body_is_untouched() {
    let source = r#"<?php

class Report
{
    public function sql(): string
    {
        return <<<SQL
SELECT *
  FROM users
SQL;
    }
}
"#;
    let mut class = ClassBuilder::from_scratch("Report");
    class
        .set_strict(false)
        .add_method(MethodSpec::new("name").body("return 'report';"));

    let output = realize(&class, source).expect("Failed to merge into report");
    assert!(output.contains("        return <<<SQL\nSELECT *\n  FROM users\nSQL;\n    }\n"));
    assert!(output.contains("public function name()"));
}
