//! Syntax trees for PHP files.
//!
//! This crate provides the arena [`Ast`] the merge engine mutates, the
//! [`Parser`] and [`Printer`] collaborator traits, and a reference
//! implementation of both ([`PhpParser`], [`PhpPrinter`]).

mod code_builder;
mod expr;
mod indent;
mod modifiers;
mod node;
pub mod php;
mod syntax;
mod tree;

pub use code_builder::CodeBuilder;
pub use expr::{ArrayItem, Expr, TypeHint, quote_string};
pub use indent::Indent;
pub use modifiers::Modifiers;
pub use node::{
    Attribute, ClassDecl, ConstDecl, InterfaceDecl, MethodDecl, Node, NodeCategory, NodeId,
    NodeKind, Param, PropertyDecl, normalize_doc,
};
pub use php::{PhpParser, PhpPrinter};
pub use syntax::{Body, ParseError, Parser, Printer};
pub use tree::Ast;
