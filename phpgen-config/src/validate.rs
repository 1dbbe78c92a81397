//! Semantic checks run after deserialization.

use miette::SourceSpan;

use crate::{Config, Result, error::SourceContext};

/// Indent widths the printer supports; `0` selects tabs.
const INDENT_WIDTHS: [u8; 4] = [0, 2, 4, 8];

pub(crate) struct Validator<'a> {
    ctx: &'a SourceContext,
}

impl<'a> Validator<'a> {
    pub fn new(ctx: &'a SourceContext) -> Self {
        Self { ctx }
    }

    pub fn validate(&self, config: &Config) -> Result<()> {
        let indent = config.generator.indent;
        if !INDENT_WIDTHS.contains(&indent) {
            return Err(self.ctx.validation_error(
                format!("indent must be one of 0 (tabs), 2, 4 or 8, got {indent}"),
                find_key_span(self.ctx.src(), "indent"),
            ));
        }

        for (prefix, dir) in &config.autoload.psr4 {
            let span = find_prefix_span(self.ctx.src(), prefix);
            if let Some(reason) = validate_prefix(prefix) {
                return Err(self.ctx.invalid_prefix_error(prefix.as_str(), reason, span));
            }
            if dir.as_os_str().is_empty() {
                return Err(self.ctx.validation_error(
                    format!("directory for '{prefix}' cannot be empty"),
                    span,
                ));
            }
        }
        Ok(())
    }
}

/// Check a PSR-4 namespace prefix. Returns `Some(reason)` when invalid.
///
/// The empty prefix is the fallback for every namespace and is allowed.
pub(crate) fn validate_prefix(prefix: &str) -> Option<&'static str> {
    if prefix.is_empty() {
        return None;
    }
    if prefix.starts_with('\\') {
        return Some("prefix must not start with a backslash");
    }
    let Some(body) = prefix.strip_suffix('\\') else {
        return Some("prefix must end with a backslash");
    };
    for segment in body.split('\\') {
        let mut chars = segment.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            Some(_) => return Some("namespace segments must start with a letter or underscore"),
            None => return Some("prefix cannot contain empty segments"),
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Some("namespace segments must contain only letters, numbers and underscores");
        }
    }
    None
}

/// Span of a bare key such as `indent = ...`.
fn find_key_span(src: &str, key: &str) -> Option<SourceSpan> {
    src.lines()
        .scan(0usize, |offset, line| {
            let start = *offset;
            *offset += line.len() + 1;
            Some((start, line))
        })
        .find_map(|(start, line)| {
            let trimmed = line.trim_start();
            let rest = trimmed.strip_prefix(key)?;
            rest.trim_start().starts_with('=').then(|| {
                let column = line.len() - trimmed.len();
                SourceSpan::from((start + column, key.len()))
            })
        })
}

/// Span of a PSR-4 prefix key. Basic strings escape the backslashes, literal
/// strings do not, so both spellings are tried.
fn find_prefix_span(src: &str, prefix: &str) -> Option<SourceSpan> {
    let escaped = prefix.replace('\\', "\\\\");
    [format!("\"{escaped}\""), format!("'{prefix}'")]
        .iter()
        .find_map(|pattern| {
            src.find(pattern.as_str())
                .map(|pos| SourceSpan::from((pos, pattern.len())))
        })
}
