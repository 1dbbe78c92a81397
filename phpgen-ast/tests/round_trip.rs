//! Printing the parse of printed output reproduces it byte for byte.

use phpgen_ast::{Indent, NodeCategory, NodeKind, Parser, PhpParser, PhpPrinter, Printer};

fn reprint(source: &str, printer: &PhpPrinter) -> String {
    let ast = PhpParser.parse(source).expect("source should parse");
    printer.print(&ast)
}

fn assert_stable(source: &str) {
    let printer = PhpPrinter::default();
    let first = reprint(source, &printer);
    let second = reprint(&first, &printer);
    assert_eq!(first, second, "printing is not stable for:\n{source}");
}

const SERVICE: &str = r#"<?php

declare(strict_types=1);

namespace App\Service;

use App\Contract\Mailer;
use Psr\Log\LoggerInterface as Logger;

/**
 * Sends newsletters.
 */
#[Service(id: 'newsletter', public: true)]
final class Newsletter extends AbstractService implements \Countable, Mailer
{
    use Loggable;
    use \App\Traits\Retry;

    public const BATCH = 100;
    private const TAGS = ['news' => 1, 'promo' => 2];

    /**
     * @var string[]
     */
    private array $queue = [];

    protected static ?Logger $logger = null;

    public function __construct(private readonly Mailer $mailer, int $retries = 3)
    {
    }

    public function count(): int
    {
        return \count($this->queue);
    }

    public function &queue(string ...$emails): array
    {
        foreach ($emails as $email) {
            $this->queue[] = "<{$email}>";
        }

        return $this->queue;
    }
}
"#;

#[test]
fn test_printed_service_is_a_fixed_point() {
    let printer = PhpPrinter::default();
    assert_eq!(reprint(SERVICE, &printer), SERVICE);
}

#[test]
fn test_unmodeled_statements_survive() {
    let source = r#"<?php

namespace App;

function helper(): string
{
    return 'x';
}

if (PHP_VERSION_ID < 80000) {
    exit(1);
} else {
    define('READY', true);
}

enum Status: string
{
    case Active = 'active';
}

class Holder
{
    use Foo {
        bar as baz;
    }

    public function hook(): void
    {
    }
}
"#;
    let printer = PhpPrinter::default();
    assert_eq!(reprint(source, &printer), source);
}

#[test]
fn test_reformatting_converges() {
    assert_stable("<?php namespace A; use B, C as D; class E extends F { const G = 1; public $h; function i() { return 1; } }");
    assert_stable("<?php\ninterface Shape extends A, B {\n  /** Area. */\n  public function area(): float;\n}\n");
    assert_stable("<?php\nreturn new class extends Migration {\n    public function up(): void {\n        Schema::create('users');\n    }\n};\n");
    assert_stable("<?php abstract class A { abstract protected function b(array &$c = array(1, 'x' => null)); }");
}

#[test]
fn test_indent_width_follows_printer() {
    let source = "<?php\nclass A\n{\n    public function b()\n    {\n        return 1;\n    }\n}\n";
    let two = reprint(source, &PhpPrinter::new(Indent::Spaces(2)));
    assert_eq!(two, "<?php\n\nclass A\n{\n  public function b()\n  {\n    return 1;\n  }\n}\n");
}

#[test]
fn test_parse_of_printed_tree_keeps_structure() {
    let ast = PhpParser.parse(SERVICE).unwrap();
    let namespace = ast.namespace().unwrap();
    assert_eq!(ast.children_of(namespace, NodeCategory::Use).count(), 2);

    let class = ast.find_class_like(Some("Newsletter")).unwrap();
    let methods: Vec<_> = ast
        .children_of(class, NodeCategory::Method)
        .filter_map(|id| match ast.kind(id) {
            NodeKind::Method(decl) => Some(decl.name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(methods, vec!["__construct", "count", "queue"]);

    let node = ast.node(class);
    assert_eq!(node.attributes[0].name, "Service");
    assert_eq!(node.attributes[0].args, vec!["id: 'newsletter'", "public: true"]);
}
