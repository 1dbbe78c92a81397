//! Line-oriented output buffer used by the printer.

use crate::Indent;

/// Accumulates printed lines at a tracked nesting depth.
///
/// ```
/// use phpgen_ast::{CodeBuilder, Indent};
///
/// let mut out = CodeBuilder::new(Indent::PSR12);
/// out.push_line("{").push_indent().push_line("return 1;").push_dedent().push_line("}");
/// assert_eq!(out.build(), "{\n    return 1;\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    depth: usize,
    indent: Indent,
    buffer: String,
}

impl CodeBuilder {
    pub fn new(indent: Indent) -> Self {
        Self {
            depth: 0,
            indent,
            buffer: String::new(),
        }
    }

    /// One line at the current depth.
    pub fn push_line(&mut self, line: &str) -> &mut Self {
        self.write_indent();
        self.buffer.push_str(line);
        self.buffer.push('\n');
        self
    }

    /// A source fragment kept as written: only its first line gets the
    /// current indentation, trailing whitespace is dropped.
    pub fn push_verbatim(&mut self, source: &str) -> &mut Self {
        for (i, line) in source.lines().enumerate() {
            if i == 0 {
                self.write_indent();
            }
            self.buffer.push_str(line.trim_end());
            self.buffer.push('\n');
        }
        self
    }

    /// Lines at the current depth; empty ones stay empty.
    pub fn push_lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for line in lines {
            if line.is_empty() {
                self.push_blank();
            } else {
                self.push_line(line);
            }
        }
        self
    }

    /// A line written as is, without indentation.
    pub fn push_raw(&mut self, line: &str) -> &mut Self {
        self.buffer.push_str(line);
        self.buffer.push('\n');
        self
    }

    /// Text appended to the last line written.
    pub fn push_trailing(&mut self, text: &str) -> &mut Self {
        if self.buffer.ends_with('\n') {
            self.buffer.pop();
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
        self
    }

    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    pub fn push_indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    pub fn push_dedent(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    pub fn build(self) -> String {
        self.buffer
    }

    fn write_indent(&mut self) {
        let unit = self.indent.unit();
        for _ in 0..self.depth {
            self.buffer.push_str(unit);
        }
    }
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::new(Indent::PSR12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_indent() {
        let mut out = CodeBuilder::new(Indent::Tab);
        out.push_line("{")
            .push_indent()
            .push_line("return 1;")
            .push_dedent()
            .push_line("}");
        assert_eq!(out.build(), "{\n\treturn 1;\n}\n");
    }

    #[test]
    fn test_dedent_stops_at_zero() {
        let mut out = CodeBuilder::default();
        out.push_dedent().push_line("<?php");
        assert_eq!(out.build(), "<?php\n");
    }

    #[test]
    fn test_push_lines_keeps_blank_lines_empty() {
        let mut out = CodeBuilder::default();
        out.push_indent().push_lines(["$a = 1;", "", "return $a;"]);
        assert_eq!(out.build(), "    $a = 1;\n\n    return $a;\n");
    }

    #[test]
    fn test_push_raw_ignores_depth() {
        let mut out = CodeBuilder::default();
        out.push_indent().push_line("$a = <<<EOT").push_raw("text").push_raw("EOT;");
        assert_eq!(out.build(), "    $a = <<<EOT\ntext\nEOT;\n");
    }

    #[test]
    fn test_push_trailing_extends_last_line() {
        let mut out = CodeBuilder::default();
        out.push_line("use Foo;").push_trailing(" // legacy");
        assert_eq!(out.build(), "use Foo; // legacy\n");
    }

    #[test]
    fn test_push_verbatim_indents_first_line_only() {
        let mut out = CodeBuilder::default();
        out.push_indent().push_verbatim("function foo() {\n    return 1;\n}  ");
        assert_eq!(out.build(), "    function foo() {\n    return 1;\n}\n");
    }
}
