//! PSR-12 style pretty-printer.

use crate::{
    Ast, Attribute, Body, ClassDecl, CodeBuilder, Indent, MethodDecl, Node, NodeCategory, NodeId,
    NodeKind, Param, Printer,
};

/// Reference [`Printer`] producing PSR-12 formatted PHP.
///
/// Statements and members are separated by one blank line, except runs of
/// imports, trait uses and constants, which are kept together.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpPrinter {
    indent: Indent,
}

impl PhpPrinter {
    pub fn new(indent: Indent) -> Self {
        Self { indent }
    }
}

impl Printer for PhpPrinter {
    fn print(&self, ast: &Ast) -> String {
        let mut out = CodeBuilder::new(self.indent);
        out.push_line("<?php");
        let statements = ast.children(ast.root());
        if !statements.is_empty() {
            out.push_blank();
            print_list(ast, statements, &mut out);
        }
        out.build()
    }
}

fn print_list(ast: &Ast, ids: &[NodeId], out: &mut CodeBuilder) {
    let mut previous: Option<NodeCategory> = None;
    for &id in ids {
        let category = ast.category(id);
        if previous.is_some_and(|previous| separated(previous, category)) {
            out.push_blank();
        }
        print_node(ast, id, out);
        previous = Some(category);
    }
}

fn separated(previous: NodeCategory, next: NodeCategory) -> bool {
    let grouped = matches!(
        previous,
        NodeCategory::Use | NodeCategory::TraitUse | NodeCategory::Constant
    );
    !(grouped && previous == next)
}

fn print_node(ast: &Ast, id: NodeId, out: &mut CodeBuilder) {
    let node = ast.node(id);
    print_preamble(node, out);

    match &node.kind {
        NodeKind::File => print_list(ast, &node.children, out),
        NodeKind::Declare { key, value } => {
            out.push_line(&format!("declare({key}={value});"));
        }
        NodeKind::Namespace { name } if name.is_empty() => {
            out.push_line("namespace {");
            out.push_indent();
            print_list(ast, &node.children, out);
            out.push_dedent();
            out.push_line("}");
        }
        NodeKind::Namespace { name } => {
            out.push_line(&format!("namespace {name};"));
            if let Some(comment) = &node.trailing_comment {
                out.push_trailing(comment);
            }
            if !node.children.is_empty() {
                out.push_blank();
                print_list(ast, &node.children, out);
            }
            return;
        }
        NodeKind::Use { name, alias } => {
            let line = match alias {
                Some(alias) => format!("use {name} as {alias};"),
                None => format!("use {name};"),
            };
            out.push_line(&line);
        }
        NodeKind::Class(decl) => print_class(ast, decl, &node.children, out),
        NodeKind::Interface(decl) => {
            let mut header = format!("interface {}", decl.name);
            if !decl.extends.is_empty() {
                header.push_str(&format!(" extends {}", decl.extends.join(", ")));
            }
            out.push_line(&header);
            print_body(ast, &node.children, out);
        }
        NodeKind::TraitUse {
            traits,
            adaptations,
        } => match adaptations {
            Some(block) => {
                out.push_line(&format!("use {} {{", traits.join(", ")));
                print_block(block, out);
                out.push_line("}");
            }
            None => {
                out.push_line(&format!("use {};", traits.join(", ")));
            }
        },
        NodeKind::Constant(decl) => {
            out.push_line(&format!(
                "{}const {} = {};",
                prefix(&decl.modifiers.to_string()),
                decl.name,
                decl.value
            ));
        }
        NodeKind::Property(decl) => {
            let mut line = if decl.modifiers.is_empty() {
                "var ".to_string()
            } else {
                format!("{} ", decl.modifiers)
            };
            if let Some(ty) = &decl.ty {
                line.push_str(&format!("{ty} "));
            }
            line.push_str(&format!("${}", decl.name));
            if let Some(default) = &decl.default {
                line.push_str(&format!(" = {default}"));
            }
            line.push(';');
            out.push_line(&line);
        }
        NodeKind::Method(decl) => print_method(decl, out),
        NodeKind::Verbatim(source) => {
            out.push_verbatim(source);
        }
    }
    if let Some(comment) = &node.trailing_comment {
        out.push_trailing(comment);
    }
}

/// Leading comments, doc comment and attributes, one per line.
fn print_preamble(node: &Node, out: &mut CodeBuilder) {
    if let Some(comment) = &node.comment {
        out.push_verbatim(comment);
    }
    if let Some(doc) = &node.doc {
        out.push_lines(doc.lines());
    }
    for attribute in &node.attributes {
        out.push_line(&format!("#[{}]", render_attribute(attribute)));
    }
}

fn print_class(ast: &Ast, decl: &ClassDecl, members: &[NodeId], out: &mut CodeBuilder) {
    let mut heritage = String::new();
    if let Some(parent) = &decl.extends {
        heritage.push_str(&format!(" extends {parent}"));
    }
    if !decl.implements.is_empty() {
        heritage.push_str(&format!(" implements {}", decl.implements.join(", ")));
    }

    match &decl.name {
        Some(name) => {
            out.push_line(&format!(
                "{}class {name}{heritage}",
                prefix(&decl.modifiers.to_string())
            ));
            print_body(ast, members, out);
        }
        None => {
            out.push_line(&format!("return new class{heritage} {{"));
            out.push_indent();
            print_list(ast, members, out);
            out.push_dedent();
            out.push_line("};");
        }
    }
}

fn print_body(ast: &Ast, members: &[NodeId], out: &mut CodeBuilder) {
    out.push_line("{");
    out.push_indent();
    print_list(ast, members, out);
    out.push_dedent();
    out.push_line("}");
}

fn print_method(decl: &MethodDecl, out: &mut CodeBuilder) {
    let params: Vec<String> = decl.params.iter().map(render_param).collect();
    let mut header = format!(
        "{}function {}{}({})",
        prefix(&decl.modifiers.to_string()),
        if decl.by_ref { "&" } else { "" },
        decl.name,
        params.join(", ")
    );
    if let Some(ty) = &decl.return_type {
        header.push_str(&format!(": {ty}"));
    }

    match &decl.body {
        None => {
            header.push(';');
            out.push_line(&header);
        }
        Some(body) => {
            out.push_line(&header);
            out.push_line("{");
            print_block(body, out);
            out.push_line("}");
        }
    }
}

/// Body lines one level deeper; raw lines go out untouched.
fn print_block(body: &Body, out: &mut CodeBuilder) {
    out.push_indent();
    for (line, raw) in body.iter() {
        if raw {
            out.push_raw(line);
        } else if line.is_empty() {
            out.push_blank();
        } else {
            out.push_line(line);
        }
    }
    out.push_dedent();
}

fn render_param(param: &Param) -> String {
    let mut out = String::new();
    for attribute in &param.attributes {
        out.push_str(&format!("#[{}] ", render_attribute(attribute)));
    }
    out.push_str(&prefix(&param.modifiers.to_string()));
    if let Some(ty) = &param.ty {
        out.push_str(&format!("{ty} "));
    }
    if param.by_ref {
        out.push('&');
    }
    if param.variadic {
        out.push_str("...");
    }
    out.push_str(&format!("${}", param.name));
    if let Some(default) = &param.default {
        out.push_str(&format!(" = {default}"));
    }
    out
}

fn render_attribute(attribute: &Attribute) -> String {
    if attribute.args.is_empty() {
        attribute.name.clone()
    } else {
        format!("{}({})", attribute.name, attribute.args.join(", "))
    }
}

/// `"final"` becomes `"final "`; empty stays empty.
fn prefix(keywords: &str) -> String {
    if keywords.is_empty() {
        String::new()
    } else {
        format!("{keywords} ")
    }
}
