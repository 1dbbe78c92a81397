//! Reference PHP front end: lexer, declaration-level parser and printer.

mod lexer;
mod parser;
mod printer;

pub use parser::PhpParser;
pub use printer::PhpPrinter;
