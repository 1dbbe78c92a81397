//! Tokenizer for the PHP subset understood by [`PhpParser`](super::PhpParser).
//!
//! Bodies are not parsed, but they are tokenized so that braces inside
//! strings, comments and heredocs do not confuse block matching.

use std::ops::Range;

use crate::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    OpenTag,
    CloseTag,
    /// Identifier or (qualified) name, keywords included: `class`, `Foo\Bar`, `\Foo`.
    Ident(String),
    /// `$name` without the dollar sign.
    Variable(String),
    Int(i64),
    Float(f64),
    /// String literal; the decoded value when it has no interpolation or
    /// escape sequences.
    Str(Option<String>),
    DocComment(String),
    /// `#[`
    AttributeOpen,
    /// `=>`
    DoubleArrow,
    /// `::`
    DoubleColon,
    /// `...`
    Ellipsis,
    Punct(char),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Keyword check, case-insensitive like PHP keywords.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(name) if name.eq_ignore_ascii_case(keyword))
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }
}

pub(crate) struct Lexer<'src> {
    src: &'src str,
    pos: usize,
    in_code: bool,
}

impl<'src> Lexer<'src> {
    /// Lexer for a whole file, starting before the `<?php` tag.
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            in_code: false,
        }
    }

    /// Lexer for a code fragment without an open tag.
    pub fn fragment(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            in_code: true,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn error(&self, message: &str, label: &str, offset: usize, len: usize) -> ParseError {
        ParseError::new(message, label, self.src, offset, len)
    }

    fn rest(&self) -> &'src str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.src.get(offset..).and_then(|s| s.chars().next())
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            end: self.pos,
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        if !self.in_code {
            return self.open_tag();
        }

        self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.peek_char() else {
            return Ok(self.token(TokenKind::Eof, start));
        };
        let rest = self.rest();

        if rest.starts_with("/**") {
            return self.doc_comment();
        }
        if rest.starts_with("#[") {
            self.pos += 2;
            return Ok(self.token(TokenKind::AttributeOpen, start));
        }
        if rest.starts_with("?>") {
            return self.close_tag();
        }
        if rest.starts_with("<<<") {
            return self.heredoc();
        }
        if rest.starts_with("=>") {
            self.pos += 2;
            return Ok(self.token(TokenKind::DoubleArrow, start));
        }
        if rest.starts_with("::") {
            self.pos += 2;
            return Ok(self.token(TokenKind::DoubleColon, start));
        }
        if rest.starts_with("...") {
            self.pos += 3;
            return Ok(self.token(TokenKind::Ellipsis, start));
        }

        match c {
            '$' if self.char_at(start + 1).is_some_and(is_ident_start) => {
                self.pos += 1;
                let name = self.ident_segment();
                Ok(self.token(TokenKind::Variable(name), start))
            }
            '\\' if self.char_at(start + 1).is_some_and(is_ident_start) => Ok(self.name()),
            c if is_ident_start(c) => Ok(self.name()),
            c if c.is_ascii_digit() => self.number(),
            '\'' => self.single_quoted(),
            '"' | '`' => self.double_quoted(c),
            c => {
                self.pos += c.len_utf8();
                Ok(self.token(TokenKind::Punct(c), start))
            }
        }
    }

    fn open_tag(&mut self) -> Result<Token, ParseError> {
        let rest = self.rest();
        match rest.find("<?php") {
            Some(index) => {
                if !rest[..index].trim().is_empty() {
                    return Err(self.error(
                        "inline HTML before '<?php' is not supported",
                        "unexpected content",
                        self.pos,
                        index,
                    ));
                }
                let start = self.pos + index;
                self.pos = start + "<?php".len();
                self.in_code = true;
                Ok(self.token(TokenKind::OpenTag, start))
            }
            None if rest.trim().is_empty() => {
                self.pos = self.src.len();
                Ok(self.token(TokenKind::Eof, self.pos))
            }
            None => Err(self.error(
                "expected '<?php' open tag",
                "file starts here",
                self.pos,
                0,
            )),
        }
    }

    fn close_tag(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.pos += 2;
        let trailing = self.rest();
        if !trailing.trim().is_empty() {
            return Err(self.error(
                "inline HTML after '?>' is not supported",
                "unexpected content",
                self.pos,
                trailing.len(),
            ));
        }
        let token = self.token(TokenKind::CloseTag, start);
        self.pos = self.src.len();
        Ok(token)
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("#[") {
                return Ok(());
            }
            if trimmed.starts_with('#') || trimmed.starts_with("//") {
                let end = line_comment_end(trimmed);
                self.pos += end;
                continue;
            }
            if trimmed.starts_with("/**") && !trimmed.starts_with("/**/") {
                return Ok(());
            }
            if trimmed.starts_with("/*") {
                match trimmed[2..].find("*/") {
                    Some(end) => {
                        self.pos += end + 4;
                        continue;
                    }
                    None => {
                        return Err(self.error(
                            "unterminated comment",
                            "comment starts here",
                            self.pos,
                            2,
                        ));
                    }
                }
            }
            return Ok(());
        }
    }

    fn doc_comment(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        match self.rest()[3..].find("*/") {
            Some(end) => {
                self.pos += end + 5;
                let text = self.src[start..self.pos].to_string();
                Ok(self.token(TokenKind::DocComment(text), start))
            }
            None => Err(self.error(
                "unterminated doc comment",
                "doc comment starts here",
                start,
                3,
            )),
        }
    }

    fn ident_segment(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if is_ident_char(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    /// Lex a possibly qualified name: `Foo`, `Foo\Bar`, `\Foo\Bar`.
    fn name(&mut self) -> Token {
        let start = self.pos;
        if self.peek_char() == Some('\\') {
            self.pos += 1;
        }
        self.ident_segment();
        while self.peek_char() == Some('\\') && self.char_at(self.pos + 1).is_some_and(is_ident_start)
        {
            self.pos += 1;
            self.ident_segment();
        }
        let text = self.src[start..self.pos].to_string();
        self.token(TokenKind::Ident(text), start)
    }

    fn number(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        let rest = self.rest();

        let radix = if rest.starts_with("0x") || rest.starts_with("0X") {
            Some(16)
        } else if rest.starts_with("0b") || rest.starts_with("0B") {
            Some(2)
        } else if rest.starts_with("0o") || rest.starts_with("0O") {
            Some(8)
        } else {
            None
        };

        if let Some(radix) = radix {
            self.pos += 2;
            let digits_start = self.pos;
            while self
                .peek_char()
                .is_some_and(|c| c.is_digit(radix) || c == '_')
            {
                self.pos += 1;
            }
            let digits = self.src[digits_start..self.pos].replace('_', "");
            return self.integer(&digits, radix, start);
        }

        let mut is_float = false;
        self.skip_digits();
        if self.peek_char() == Some('.') && self.char_at(self.pos + 1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.pos += 1;
            self.skip_digits();
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let after = self.char_at(self.pos + 1);
            let signed = matches!(after, Some('+' | '-'))
                && self.char_at(self.pos + 2).is_some_and(|c| c.is_ascii_digit());
            if signed || after.is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.pos += if signed { 2 } else { 1 };
                self.skip_digits();
            }
        }

        let text = self.src[start..self.pos].replace('_', "");
        if is_float {
            let value = text.parse::<f64>().map_err(|_| {
                self.error("invalid float literal", "here", start, self.pos - start)
            })?;
            return Ok(self.token(TokenKind::Float(value), start));
        }
        if text.len() > 1 && text.starts_with('0') {
            return self.integer(&text[1..], 8, start);
        }
        self.integer(&text, 10, start)
    }

    fn skip_digits(&mut self) {
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_digit() || c == '_')
        {
            self.pos += 1;
        }
    }

    fn integer(&self, digits: &str, radix: u32, start: usize) -> Result<Token, ParseError> {
        if let Ok(value) = i64::from_str_radix(digits, radix) {
            return Ok(self.token(TokenKind::Int(value), start));
        }
        // Integers that overflow become floats, as in PHP.
        u128::from_str_radix(digits, radix)
            .map(|value| self.token(TokenKind::Float(value as f64), start))
            .map_err(|_| self.error("invalid integer literal", "here", start, self.pos - start))
    }

    fn single_quoted(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        while let Some(c) = self.peek_char() {
            match c {
                '\\' => match self.char_at(self.pos + 1) {
                    Some(next @ ('\\' | '\'')) => {
                        value.push(next);
                        self.pos += 2;
                    }
                    _ => {
                        value.push('\\');
                        self.pos += 1;
                    }
                },
                '\'' => {
                    self.pos += 1;
                    return Ok(self.token(TokenKind::Str(Some(value)), start));
                }
                c => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        Err(self.error("unterminated string", "string starts here", start, 1))
    }

    fn double_quoted(&mut self, quote: char) -> Result<Token, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut plain = quote == '"';
        while let Some(c) = self.peek_char() {
            match c {
                '\\' => {
                    plain = false;
                    self.pos += 1;
                    if let Some(next) = self.peek_char() {
                        self.pos += next.len_utf8();
                    }
                }
                '$' => {
                    plain = false;
                    self.pos += 1;
                }
                c if c == quote => {
                    let content = &self.src[start + 1..self.pos];
                    self.pos += 1;
                    let value = plain.then(|| content.to_string());
                    return Ok(self.token(TokenKind::Str(value), start));
                }
                c => self.pos += c.len_utf8(),
            }
        }
        Err(self.error("unterminated string", "string starts here", start, 1))
    }

    fn heredoc(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.pos += 3;
        let header_end = self.rest().find('\n').map(|i| self.pos + i);
        let Some(header_end) = header_end else {
            return Err(self.error("unterminated heredoc", "heredoc starts here", start, 3));
        };
        let label: String = self.src[self.pos..header_end]
            .trim()
            .trim_matches(|c| c == '\'' || c == '"')
            .to_string();
        if label.is_empty() {
            return Err(self.error("missing heredoc label", "heredoc starts here", start, 3));
        }

        let mut offset = header_end + 1;
        for line in self.src[header_end + 1..].split_inclusive('\n') {
            let trimmed = line.trim_start();
            if let Some(after) = trimmed.strip_prefix(label.as_str())
                && !after.chars().next().is_some_and(is_ident_char)
            {
                self.pos = offset + (line.len() - trimmed.len()) + label.len();
                return Ok(self.token(TokenKind::Str(None), start));
            }
            offset += line.len();
        }
        Err(self.error("unterminated heredoc", "heredoc starts here", start, 3))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

/// Length of a `//` or `#` comment, which ends at a newline or before `?>`.
fn line_comment_end(s: &str) -> usize {
    let newline = s.find('\n').unwrap_or(s.len());
    let close = s.find("?>").unwrap_or(s.len());
    newline.min(close)
}

/// Spans of the `//`, `#` and `/* */` comments in source lying between two
/// tokens, which holds nothing but whitespace and comments.
pub(crate) fn comment_spans(gap: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut pos = 0;
    loop {
        let rest = &gap[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        let len = if trimmed.starts_with('#') || trimmed.starts_with("//") {
            line_comment_end(trimmed)
        } else if let Some(inner) = trimmed.strip_prefix("/*") {
            inner.find("*/").map_or(trimmed.len(), |end| end + 4)
        } else {
            return spans;
        };
        spans.push(pos..pos + len);
        pos += len;
    }
}
