//! Collaborator interfaces: turning source into trees and back.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::Ast;

/// Turns PHP source into an [`Ast`].
pub trait Parser {
    /// Parse a whole file. Empty input yields an empty tree.
    fn parse(&self, source: &str) -> Result<Ast, ParseError>;

    /// Parse a method body fragment (the statements between the braces).
    fn parse_body(&self, fragment: &str) -> Result<Body, ParseError>;
}

/// Renders an [`Ast`] back to PHP source.
///
/// Printing must be deterministic: printing the parse of printed output
/// reproduces it byte for byte.
pub trait Printer {
    fn print(&self, ast: &Ast) -> String;
}

/// An opaque block of statements, stored as dedented source lines.
///
/// Heredoc and nowdoc text, closing marker included, is kept exactly as
/// written: those lines are raw and never re-indented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body {
    lines: Vec<String>,
    raw: Vec<bool>,
}

impl Body {
    pub fn new(lines: Vec<String>) -> Self {
        let raw = vec![false; lines.len()];
        Self { lines, raw }
    }

    /// Normalize a source fragment: trailing whitespace and common
    /// indentation removed, leading and trailing blank lines dropped.
    /// Raw lines do not count towards the common indentation.
    pub fn from_source(fragment: &str) -> Self {
        let source: Vec<&str> = fragment.lines().collect();
        let raw = heredoc_lines(&source);
        let indent = source
            .iter()
            .zip(&raw)
            .filter(|(line, raw)| !**raw && !line.trim().is_empty())
            .map(|(line, _)| line.chars().take_while(|c| c.is_whitespace()).count())
            .min()
            .unwrap_or(0);

        let mut lines: Vec<(String, bool)> = source
            .iter()
            .zip(raw)
            .map(|(line, raw)| {
                if raw {
                    (line.to_string(), true)
                } else {
                    (line.trim_end().chars().skip(indent).collect(), false)
                }
            })
            .collect();

        while lines.last().is_some_and(|(line, raw)| !raw && line.is_empty()) {
            lines.pop();
        }
        let leading = lines
            .iter()
            .take_while(|(line, raw)| !raw && line.is_empty())
            .count();
        lines.drain(..leading);

        let (lines, raw) = lines.into_iter().unzip();
        Self { lines, raw }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines paired with whether they must be printed as written.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.lines
            .iter()
            .map(String::as_str)
            .zip(self.raw.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Marks the lines after a `<<<LABEL` opener up to and including the line
/// closing it. An opener without a closing line marks nothing.
fn heredoc_lines(lines: &[&str]) -> Vec<bool> {
    let mut raw = vec![false; lines.len()];
    let mut index = 0;
    while index < lines.len() {
        let Some(label) = heredoc_label(lines[index]) else {
            index += 1;
            continue;
        };
        let close = lines[index + 1..]
            .iter()
            .position(|line| closes_heredoc(line, label))
            .map(|offset| index + 1 + offset);
        match close {
            Some(close) => {
                raw[index + 1..=close].fill(true);
                index = close + 1;
            }
            None => index += 1,
        }
    }
    raw
}

/// The label of a heredoc or nowdoc opened at the end of `line`.
fn heredoc_label(line: &str) -> Option<&str> {
    let (_, rest) = line.rsplit_once("<<<")?;
    let label = rest.trim().trim_matches(|c| c == '\'' || c == '"');
    let valid = label
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(label)
}

fn closes_heredoc(line: &str, label: &str) -> bool {
    line.trim_start()
        .strip_prefix(label)
        .is_some_and(|after| !after.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'))
}

/// A syntax error with the offending source location.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(phpgen::parse_error))]
pub struct ParseError {
    #[source_code]
    src: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    message: String,
    label: String,
}

impl ParseError {
    pub fn new(
        message: impl Into<String>,
        label: impl Into<String>,
        source: &str,
        offset: usize,
        len: usize,
    ) -> Self {
        Self {
            src: NamedSource::new("input.php", source.to_string()),
            span: SourceSpan::from((offset, len)),
            message: message.into(),
            label: label.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Byte offset of the error in the parsed source.
    pub fn offset(&self) -> usize {
        self.span.offset()
    }
}
