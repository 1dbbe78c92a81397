//! Recursive-descent parser for the declaration-level subset of PHP.

use tracing::{debug, trace};

use super::lexer::{Lexer, Token, TokenKind, comment_spans};
use crate::{
    ArrayItem, Ast, Attribute, Body, ClassDecl, ConstDecl, Expr, InterfaceDecl, MethodDecl,
    Modifiers, Node, NodeId, NodeKind, Param, ParseError, Parser, PropertyDecl, TypeHint,
    normalize_doc,
};

/// Reference [`Parser`] for PHP source.
///
/// Namespaces, imports, `declare`, classes, interfaces and their members are
/// parsed into nodes. Every other statement or member is kept as
/// [`NodeKind::Verbatim`] source, so printing does not lose it.
///
/// Plain comments between statements and members survive too. A comment
/// directly above an item becomes its [`Node::comment`], one on the line of
/// an item becomes its [`Node::trailing_comment`], and a comment set apart
/// by blank lines is kept as a verbatim node of its own.
///
/// Anonymous classes are recognized in the `return new class ... { ... };`
/// form.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpParser;

impl PhpParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for PhpParser {
    fn parse(&self, source: &str) -> Result<Ast, ParseError> {
        let tokens = Lexer::new(source).tokenize()?;
        let ast = Reader::new(source, tokens).file()?;
        debug!(
            statements = ast.children(ast.root()).len(),
            "parsed php source"
        );
        Ok(ast)
    }

    fn parse_body(&self, fragment: &str) -> Result<Body, ParseError> {
        let tokens = Lexer::fragment(fragment).tokenize()?;
        let mut open: Vec<&Token> = Vec::new();
        for token in &tokens {
            match token.kind {
                TokenKind::Punct('{' | '(' | '[') => open.push(token),
                TokenKind::Punct(c @ ('}' | ')' | ']')) => {
                    if open.pop().is_none() {
                        return Err(ParseError::new(
                            format!("unmatched '{c}'"),
                            "no matching opener",
                            fragment,
                            token.start,
                            1,
                        ));
                    }
                }
                TokenKind::CloseTag => {
                    return Err(ParseError::new(
                        "'?>' is not allowed in a method body",
                        "here",
                        fragment,
                        token.start,
                        2,
                    ));
                }
                _ => {}
            }
        }
        if let Some(token) = open.last() {
            return Err(ParseError::new(
                "unclosed delimiter in method body",
                "opened here",
                fragment,
                token.start,
                1,
            ));
        }
        Ok(Body::from_source(fragment))
    }
}

/// Cursor over the token stream, building the tree as it goes.
///
/// Structured parsing is attempted first; routines returning `None` mean "not
/// in the modeled subset", after which the caller rewinds and keeps the
/// source verbatim. Hard errors only come from unbalanced delimiters and
/// truncated input.
struct Reader<'src> {
    src: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    ast: Ast,
}

impl<'src> Reader<'src> {
    fn new(src: &'src str, tokens: Vec<Token>) -> Self {
        Self {
            src,
            tokens,
            pos: 0,
            ast: Ast::new(),
        }
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    /// First index at or after `from` that is not a doc comment. The token
    /// stream always ends with `Eof`, so this never runs past the end.
    fn skip_docs(&self, from: usize) -> usize {
        let mut index = from.min(self.tokens.len() - 1);
        while index + 1 < self.tokens.len()
            && matches!(self.tokens[index].kind, TokenKind::DocComment(_))
        {
            index += 1;
        }
        index
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.skip_docs(self.pos)]
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let mut index = self.skip_docs(self.pos);
        for _ in 0..n {
            index = self.skip_docs(index + 1);
        }
        &self.tokens[index]
    }

    fn bump(&mut self) -> Token {
        let index = self.skip_docs(self.pos);
        self.pos = (index + 1).min(self.tokens.len() - 1);
        self.tokens[index].clone()
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        self.eat(&TokenKind::Punct(c))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_keyword(keyword) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<String> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump();
                Some(name)
            }
            _ => None,
        }
    }

    fn variable(&mut self) -> Option<String> {
        match &self.peek().kind {
            TokenKind::Variable(name) => {
                let name = name.clone();
                self.bump();
                Some(name)
            }
            _ => None,
        }
    }

    /// Doc comments directly ahead; the last one wins.
    fn leading_doc(&mut self) -> Option<String> {
        let mut doc = None;
        while let TokenKind::DocComment(text) = &self.tokens[self.pos].kind {
            doc = Some(normalize_doc(text));
            self.pos += 1;
        }
        doc
    }

    /// Source text spanning tokens `from..to`.
    fn text(&self, from: usize, to: usize) -> String {
        self.src[self.tokens[from].start..self.tokens[to - 1].end].to_string()
    }

    /// Comments in the source between the last consumed token and the next
    /// one, grouped into runs without blank lines.
    fn comment_runs(&self) -> Vec<CommentRun> {
        let Some(previous) = self.pos.checked_sub(1) else {
            return Vec::new();
        };
        let gap_start = self.tokens[previous].end;
        let gap_end = self.tokens[self.pos].start;
        let breaks = |from: usize, to: usize| self.src[from..to].matches('\n').count();

        let mut runs: Vec<CommentRun> = Vec::new();
        let mut cursor = gap_start;
        for span in comment_spans(&self.src[gap_start..gap_end]) {
            let (start, end) = (gap_start + span.start, gap_start + span.end);
            let before = breaks(cursor, start);
            let joins = runs
                .last()
                .is_some_and(|run| before == 0 || (before == 1 && !run.same_line));
            match runs.last_mut() {
                Some(run) if joins => run.end = end,
                _ => runs.push(CommentRun {
                    start,
                    end,
                    same_line: cursor == gap_start && before == 0,
                    blank_before: before > 1,
                    blank_after: false,
                }),
            }
            cursor = end;
        }
        for index in 0..runs.len() {
            let next = runs.get(index + 1).map_or(gap_end, |run| run.start);
            runs[index].blank_after = breaks(runs[index].end, next) > 1;
        }
        runs
    }

    /// Place the comments ahead of the next item of `scope`, returning the
    /// ones that lead it. `previous` is the item just read, if any.
    fn comments(&mut self, scope: NodeId, previous: Option<NodeId>) -> Option<String> {
        let at_end = matches!(
            self.peek().kind,
            TokenKind::Eof | TokenKind::CloseTag | TokenKind::Punct('}')
        );
        let runs = self.comment_runs();
        let gap_start = self.tokens[self.pos - 1].end;
        let mut trailing_end = None;
        let mut leading = None;
        for (index, run) in runs.iter().enumerate() {
            let follows = index == 0 || trailing_end == Some(runs[index - 1].end);
            let trails = run.same_line || (at_end && follows && !run.blank_before);
            if previous.is_some() && trails {
                trailing_end = Some(run.end);
                continue;
            }
            let text = self.src[run.start..run.end].to_string();
            if index + 1 == runs.len() && !at_end && !run.blank_after {
                leading = Some(text);
            } else {
                let node = self.ast.alloc(Node::new(NodeKind::Verbatim(text)));
                self.ast.push_child(scope, node);
            }
        }
        if let (Some(previous), Some(end)) = (previous, trailing_end) {
            self.ast.node_mut(previous).trailing_comment = Some(self.src[gap_start..end].to_string());
        }
        leading
    }

    fn error(&self, token: &Token, message: &str, label: &str) -> ParseError {
        ParseError::new(
            message,
            label,
            self.src,
            token.start,
            token.end - token.start,
        )
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn file(mut self) -> Result<Ast, ParseError> {
        if self.bump().kind != TokenKind::OpenTag {
            return Ok(self.ast);
        }

        let root = self.ast.root();
        let mut scope = root;
        let mut previous = None;
        loop {
            let comment = self.comments(scope, previous);
            match self.peek().kind {
                TokenKind::Eof | TokenKind::CloseTag => break,
                _ => {}
            }
            if self.peek().is_keyword("namespace")
                && matches!(
                    self.peek_nth(1).kind,
                    TokenKind::Ident(_) | TokenKind::Punct('{')
                )
            {
                let (namespace, braced) = self.namespace()?;
                self.ast.node_mut(namespace).comment = comment;
                self.ast.push_child(root, namespace);
                scope = if braced { root } else { namespace };
                previous = Some(namespace);
                continue;
            }
            if self.peek().is_punct('}') {
                let token = self.peek().clone();
                return Err(self.error(&token, "unexpected '}'", "no matching '{'"));
            }
            let ids = self.statement()?;
            previous = self.push_items(scope, ids, comment);
        }
        Ok(self.ast)
    }

    /// `namespace Foo;` or `namespace Foo { ... }`. Returns the node and
    /// whether it was the braced form.
    fn namespace(&mut self) -> Result<(NodeId, bool), ParseError> {
        let doc = self.leading_doc();
        self.bump();
        let name = self.ident().unwrap_or_default();
        let namespace = self
            .ast
            .alloc(Node::new(NodeKind::Namespace { name }).with_doc(doc));

        if self.eat_punct(';') {
            return Ok((namespace, false));
        }
        let open = self.peek().clone();
        if !self.eat_punct('{') {
            return Err(self.error(&open, "expected ';' or '{' after namespace", "here"));
        }
        let mut previous = None;
        loop {
            let comment = self.comments(namespace, previous);
            match self.peek().kind {
                TokenKind::Punct('}') => {
                    self.bump();
                    return Ok((namespace, true));
                }
                TokenKind::Eof | TokenKind::CloseTag => {
                    return Err(self.error(&open, "unclosed namespace block", "opened here"));
                }
                _ => {
                    let ids = self.statement()?;
                    previous = self.push_items(namespace, ids, comment);
                }
            }
        }
    }

    /// Append freshly read items to `scope`, the first one taking the
    /// comment above it. Returns the last item.
    fn push_items(
        &mut self,
        scope: NodeId,
        ids: Vec<NodeId>,
        comment: Option<String>,
    ) -> Option<NodeId> {
        if let Some(&first) = ids.first() {
            self.ast.node_mut(first).comment = comment;
        }
        for &id in &ids {
            self.ast.push_child(scope, id);
        }
        ids.last().copied()
    }

    fn statement(&mut self) -> Result<Vec<NodeId>, ParseError> {
        let start = self.pos;
        let doc = self.leading_doc();
        let parsed = match self.attributes() {
            Some(attributes) => {
                let doc = match doc {
                    Some(doc) => Some(doc),
                    None => self.leading_doc(),
                };
                self.declaration(doc, attributes)?
            }
            None => None,
        };
        match parsed {
            Some(ids) => Ok(ids),
            None => {
                self.pos = start;
                Ok(vec![self.verbatim(start)?])
            }
        }
    }

    fn declaration(
        &mut self,
        doc: Option<String>,
        attributes: Vec<Attribute>,
    ) -> Result<Option<Vec<NodeId>>, ParseError> {
        if attributes.is_empty() {
            if self.peek().is_keyword("declare") {
                return Ok(self.declare(doc).map(|id| vec![id]));
            }
            if self.peek().is_keyword("use") {
                return Ok(self.imports(doc));
            }
        }
        if self.peek().is_keyword("interface") {
            return self.interface(doc, attributes);
        }
        if self.peek().is_keyword("return")
            && self.peek_nth(1).is_keyword("new")
            && self.peek_nth(2).is_keyword("class")
        {
            return self.anonymous_class(doc, attributes);
        }
        if self.class_ahead() {
            return self.class(doc, attributes);
        }
        Ok(None)
    }

    fn declare(&mut self, doc: Option<String>) -> Option<NodeId> {
        self.bump();
        if !self.eat_punct('(') {
            return None;
        }
        let key = self.ident()?;
        if !self.eat_punct('=') {
            return None;
        }
        let value = self.expr(&[])?;
        if !(self.eat_punct(')') && self.eat_punct(';')) {
            return None;
        }
        Some(
            self.ast
                .alloc(Node::new(NodeKind::Declare { key, value }).with_doc(doc)),
        )
    }

    /// `use A\B, C as D;` yields one node per imported name. Function and
    /// constant imports and group uses are left to the verbatim path.
    fn imports(&mut self, doc: Option<String>) -> Option<Vec<NodeId>> {
        self.bump();
        if self.peek().is_keyword("function") || self.peek().is_keyword("const") {
            return None;
        }
        let mut doc = doc;
        let mut ids = Vec::new();
        loop {
            let name = self.ident()?;
            let alias = if self.eat_keyword("as") {
                Some(self.ident()?)
            } else {
                None
            };
            let node = Node::new(NodeKind::Use { name, alias }).with_doc(doc.take());
            ids.push(self.ast.alloc(node));
            if !self.eat_punct(',') {
                break;
            }
        }
        self.eat_punct(';').then_some(ids)
    }

    fn class_ahead(&self) -> bool {
        let mut n = 0;
        loop {
            let token = self.peek_nth(n);
            if token.is_keyword("class") {
                return true;
            }
            if ["abstract", "final", "readonly"]
                .iter()
                .any(|keyword| token.is_keyword(keyword))
            {
                n += 1;
            } else {
                return false;
            }
        }
    }

    fn class(
        &mut self,
        doc: Option<String>,
        attributes: Vec<Attribute>,
    ) -> Result<Option<Vec<NodeId>>, ParseError> {
        let mut modifiers = Modifiers::NONE;
        while !self.peek().is_keyword("class") {
            let Some(flag) = self.ident().as_deref().and_then(Modifiers::from_keyword) else {
                return Ok(None);
            };
            modifiers.insert(flag);
        }
        self.bump();

        let Some(name) = self.ident() else {
            return Ok(None);
        };
        let Some((extends, implements)) = self.class_heritage() else {
            return Ok(None);
        };
        if !self.peek().is_punct('{') {
            return Ok(None);
        }

        let decl = ClassDecl {
            name: Some(name),
            modifiers,
            extends,
            implements,
        };
        let class = self.ast.alloc(
            Node::new(NodeKind::Class(decl))
                .with_doc(doc)
                .with_attributes(attributes),
        );
        self.class_body(class)?;
        Ok(Some(vec![class]))
    }

    /// `return new class extends Foo implements Bar { ... };`
    fn anonymous_class(
        &mut self,
        doc: Option<String>,
        attributes: Vec<Attribute>,
    ) -> Result<Option<Vec<NodeId>>, ParseError> {
        self.bump();
        self.bump();
        self.bump();
        let Some((extends, implements)) = self.class_heritage() else {
            return Ok(None);
        };
        if !self.peek().is_punct('{') {
            return Ok(None);
        }

        let decl = ClassDecl {
            name: None,
            modifiers: Modifiers::NONE,
            extends,
            implements,
        };
        let class = self.ast.alloc(
            Node::new(NodeKind::Class(decl))
                .with_doc(doc)
                .with_attributes(attributes),
        );
        self.class_body(class)?;
        if !self.eat_punct(';') {
            return Ok(None);
        }
        Ok(Some(vec![class]))
    }

    fn class_heritage(&mut self) -> Option<(Option<String>, Vec<String>)> {
        let extends = if self.eat_keyword("extends") {
            Some(self.ident()?)
        } else {
            None
        };
        let implements = if self.eat_keyword("implements") {
            self.name_list()?
        } else {
            Vec::new()
        };
        Some((extends, implements))
    }

    fn interface(
        &mut self,
        doc: Option<String>,
        attributes: Vec<Attribute>,
    ) -> Result<Option<Vec<NodeId>>, ParseError> {
        self.bump();
        let Some(name) = self.ident() else {
            return Ok(None);
        };
        let extends = if self.eat_keyword("extends") {
            match self.name_list() {
                Some(names) => names,
                None => return Ok(None),
            }
        } else {
            Vec::new()
        };
        if !self.peek().is_punct('{') {
            return Ok(None);
        }

        let interface = self.ast.alloc(
            Node::new(NodeKind::Interface(InterfaceDecl { name, extends }))
                .with_doc(doc)
                .with_attributes(attributes),
        );
        self.class_body(interface)?;
        Ok(Some(vec![interface]))
    }

    fn name_list(&mut self) -> Option<Vec<String>> {
        let mut names = vec![self.ident()?];
        while self.eat_punct(',') {
            names.push(self.ident()?);
        }
        Some(names)
    }

    // =========================================================================
    // Class members
    // =========================================================================

    fn class_body(&mut self, class: NodeId) -> Result<(), ParseError> {
        let open = self.bump();
        let mut previous = None;
        loop {
            let comment = self.comments(class, previous);
            match self.peek().kind {
                TokenKind::Punct('}') => {
                    self.bump();
                    return Ok(());
                }
                TokenKind::Eof | TokenKind::CloseTag => {
                    return Err(self.error(&open, "unclosed class body", "opened here"));
                }
                _ => {
                    let ids = self.member()?;
                    previous = self.push_items(class, ids, comment);
                }
            }
        }
    }

    fn member(&mut self) -> Result<Vec<NodeId>, ParseError> {
        let start = self.pos;
        let doc = self.leading_doc();
        let parsed = match self.attributes() {
            Some(attributes) => {
                let doc = match doc {
                    Some(doc) => Some(doc),
                    None => self.leading_doc(),
                };
                self.member_declaration(doc, attributes)
            }
            None => None,
        };
        match parsed {
            Some(ids) => Ok(ids),
            None => {
                self.pos = start;
                Ok(vec![self.verbatim(start)?])
            }
        }
    }

    fn member_declaration(
        &mut self,
        doc: Option<String>,
        attributes: Vec<Attribute>,
    ) -> Option<Vec<NodeId>> {
        if self.eat_keyword("use") {
            let traits = self.name_list()?;
            let adaptations = if self.peek().is_punct('{') {
                Some(self.block()?)
            } else if self.eat_punct(';') {
                None
            } else {
                return None;
            };
            let node = Node::new(NodeKind::TraitUse {
                traits,
                adaptations,
            })
                .with_doc(doc)
                .with_attributes(attributes);
            return Some(vec![self.ast.alloc(node)]);
        }

        let mut modifiers = Modifiers::NONE;
        let mut var = false;
        while let TokenKind::Ident(word) = &self.peek().kind {
            if word.eq_ignore_ascii_case("var") {
                var = true;
                self.bump();
                continue;
            }
            match Modifiers::from_keyword(word) {
                Some(flag) => {
                    modifiers.insert(flag);
                    self.bump();
                }
                None => break,
            }
        }

        if self.eat_keyword("const") {
            return self.constants(doc, attributes, modifiers);
        }
        if self.peek().is_keyword("function") {
            return self
                .method(doc, attributes, modifiers)
                .map(|method| vec![method]);
        }
        if modifiers.is_empty() && !var {
            return None;
        }
        self.properties(doc, attributes, modifiers)
    }

    fn constants(
        &mut self,
        doc: Option<String>,
        attributes: Vec<Attribute>,
        modifiers: Modifiers,
    ) -> Option<Vec<NodeId>> {
        // Typed constants (`const string FOO = ...`) are not modeled.
        if !self.peek_nth(1).is_punct('=') {
            return None;
        }
        let mut doc = doc;
        let mut attributes = Some(attributes);
        let mut ids = Vec::new();
        loop {
            let name = self.ident()?;
            if !self.eat_punct('=') {
                return None;
            }
            let value = self.expr(&[',', ';'])?;
            let node = Node::new(NodeKind::Constant(ConstDecl {
                name,
                modifiers,
                value,
            }))
            .with_doc(doc.take())
            .with_attributes(attributes.take().unwrap_or_default());
            ids.push(self.ast.alloc(node));
            if !self.eat_punct(',') {
                break;
            }
        }
        self.eat_punct(';').then_some(ids)
    }

    fn properties(
        &mut self,
        doc: Option<String>,
        attributes: Vec<Attribute>,
        modifiers: Modifiers,
    ) -> Option<Vec<NodeId>> {
        let ty = match self.peek().kind {
            TokenKind::Variable(_) => None,
            _ => Some(self.type_hint()?),
        };
        let mut doc = doc;
        let mut attributes = Some(attributes);
        let mut ids = Vec::new();
        loop {
            let name = self.variable()?;
            let default = if self.eat_punct('=') {
                Some(self.expr(&[',', ';'])?)
            } else {
                None
            };
            // Property hooks are not modeled.
            if self.peek().is_punct('{') {
                return None;
            }
            let node = Node::new(NodeKind::Property(PropertyDecl {
                name,
                modifiers,
                ty: ty.clone(),
                default,
            }))
            .with_doc(doc.take())
            .with_attributes(attributes.take().unwrap_or_default());
            ids.push(self.ast.alloc(node));
            if !self.eat_punct(',') {
                break;
            }
        }
        self.eat_punct(';').then_some(ids)
    }

    fn method(
        &mut self,
        doc: Option<String>,
        attributes: Vec<Attribute>,
        modifiers: Modifiers,
    ) -> Option<NodeId> {
        self.bump();
        let by_ref = self.eat_punct('&');
        let name = self.ident()?;
        if !self.eat_punct('(') {
            return None;
        }
        let params = self.params()?;
        let return_type = if self.eat_punct(':') {
            Some(self.type_hint()?)
        } else {
            None
        };
        let body = if self.eat_punct(';') {
            None
        } else if self.peek().is_punct('{') {
            Some(self.block()?)
        } else {
            return None;
        };

        let decl = MethodDecl {
            name,
            modifiers,
            by_ref,
            params,
            return_type,
            body,
        };
        let node = Node::new(NodeKind::Method(decl))
            .with_doc(doc)
            .with_attributes(attributes);
        Some(self.ast.alloc(node))
    }

    fn params(&mut self) -> Option<Vec<Param>> {
        let mut params = Vec::new();
        while !self.peek().is_punct(')') {
            params.push(self.param()?);
            if !self.eat_punct(',') {
                break;
            }
        }
        self.eat_punct(')').then_some(params)
    }

    fn param(&mut self) -> Option<Param> {
        let attributes = self.attributes()?;
        let mut modifiers = Modifiers::NONE;
        while let Some(flag) = match &self.peek().kind {
            TokenKind::Ident(word) => Modifiers::from_keyword(word),
            _ => None,
        } {
            modifiers.insert(flag);
            self.bump();
        }

        let ty = match self.peek().kind {
            TokenKind::Variable(_) | TokenKind::Punct('&') | TokenKind::Ellipsis => None,
            _ => Some(self.type_hint()?),
        };
        let by_ref = self.eat_punct('&');
        let variadic = self.eat(&TokenKind::Ellipsis);
        let name = self.variable()?;
        let default = if self.eat_punct('=') {
            Some(self.expr(&[','])?)
        } else {
            None
        };

        Some(Param {
            name,
            ty,
            default,
            by_ref,
            variadic,
            modifiers,
            attributes,
        })
    }

    /// `?Foo`, `int|string`, `A&B`. DNF types fall back to verbatim.
    fn type_hint(&mut self) -> Option<TypeHint> {
        let nullable = self.eat_punct('?');
        let mut name = self.ident()?;
        loop {
            if self.peek().is_punct('|') {
                self.bump();
                name.push('|');
            } else if self.peek().is_punct('&')
                && matches!(self.peek_nth(1).kind, TokenKind::Ident(_))
            {
                self.bump();
                name.push('&');
            } else {
                break;
            }
            name.push_str(&self.ident()?);
        }
        Some(TypeHint { nullable, name })
    }

    /// The statements between a pair of braces, kept as an opaque body.
    fn block(&mut self) -> Option<Body> {
        let open = self.skip_docs(self.pos);
        let mut depth = 0usize;
        for index in open..self.tokens.len() {
            match self.tokens[index].kind {
                TokenKind::Punct('{' | '(' | '[') | TokenKind::AttributeOpen => depth += 1,
                TokenKind::Punct('}' | ')' | ']') => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let inner = &self.src[self.tokens[open].end..self.tokens[index].start];
                        self.pos = index + 1;
                        return Some(Body::from_source(inner));
                    }
                }
                TokenKind::Eof | TokenKind::CloseTag => return None,
                _ => {}
            }
        }
        None
    }

    fn attributes(&mut self) -> Option<Vec<Attribute>> {
        let mut attributes = Vec::new();
        while self.eat(&TokenKind::AttributeOpen) {
            loop {
                let mut attribute = Attribute::new(self.ident()?);
                if self.peek().is_punct('(') {
                    attribute.args = self.attribute_args()?;
                }
                attributes.push(attribute);
                if self.eat_punct(']') {
                    break;
                }
                if !self.eat_punct(',') {
                    return None;
                }
                if self.eat_punct(']') {
                    break;
                }
            }
        }
        Some(attributes)
    }

    /// Split `( ... )` into argument source strings at top-level commas.
    fn attribute_args(&mut self) -> Option<Vec<String>> {
        let open = self.skip_docs(self.pos);
        let mut args = Vec::new();
        let mut depth = 0usize;
        let mut arg_start = open + 1;
        for index in open + 1..self.tokens.len() {
            match self.tokens[index].kind {
                TokenKind::Eof | TokenKind::CloseTag => return None,
                TokenKind::Punct('(' | '[' | '{') | TokenKind::AttributeOpen => depth += 1,
                TokenKind::Punct(')') if depth == 0 => {
                    if index > arg_start {
                        args.push(self.text(arg_start, index));
                    }
                    self.pos = index + 1;
                    return Some(args);
                }
                TokenKind::Punct(',') if depth == 0 => {
                    if index > arg_start {
                        args.push(self.text(arg_start, index));
                    }
                    arg_start = index + 1;
                }
                TokenKind::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        None
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Read an expression up to a top-level terminator or an unbalanced
    /// closing delimiter. Literals become structured [`Expr`] values, anything
    /// else is kept as [`Expr::Raw`].
    fn expr(&mut self, terminators: &[char]) -> Option<Expr> {
        let start = self.skip_docs(self.pos);
        let mut depth = 0usize;
        let mut end = start;
        loop {
            match self.tokens[end].kind {
                TokenKind::Eof | TokenKind::CloseTag => return None,
                TokenKind::Punct(c) if depth == 0 && terminators.contains(&c) => break,
                TokenKind::Punct('(' | '[' | '{') | TokenKind::AttributeOpen => depth += 1,
                TokenKind::Punct(')' | ']' | '}') => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            end += 1;
        }
        if end == start {
            return None;
        }

        self.pos = end;
        let tokens = &self.tokens[start..end];
        Some(literal_expr(tokens).unwrap_or_else(|| Expr::Raw(self.text(start, end))))
    }

    /// Capture one statement or member as source text, starting at token
    /// `start` (doc comments and attributes included).
    ///
    /// A statement ends at a top-level `;`, or at the `}` closing its first
    /// top-level block unless an `else`/`catch`-style continuation follows.
    fn verbatim(&mut self, start: usize) -> Result<NodeId, ParseError> {
        let lead = self.skip_docs(start);
        let starts_with_do = self.tokens[lead].is_keyword("do");
        let mut depth = 0usize;
        let mut index = start;
        let end = loop {
            let token = &self.tokens[index];
            match token.kind {
                TokenKind::Eof => {
                    return Err(self.error(
                        &self.tokens[lead],
                        "unexpected end of file",
                        "statement starts here",
                    ));
                }
                TokenKind::CloseTag if depth == 0 && index > lead => break index,
                TokenKind::CloseTag => {
                    return Err(self.error(token, "unexpected '?>'", "inside this block"));
                }
                TokenKind::Punct(';') if depth == 0 => break index + 1,
                TokenKind::Punct('(' | '[' | '{') | TokenKind::AttributeOpen => depth += 1,
                TokenKind::Punct(c @ (')' | ']' | '}')) => {
                    if depth == 0 {
                        return Err(self.error(
                            token,
                            &format!("unexpected '{c}'"),
                            "no matching opener",
                        ));
                    }
                    depth -= 1;
                    if depth == 0 && c == '}' {
                        let next_index = self.skip_docs(index + 1);
                        let next = &self.tokens[next_index];
                        if next.is_punct(';') {
                            break next_index + 1;
                        }
                        let continues = ["else", "elseif", "catch", "finally"]
                            .iter()
                            .any(|keyword| next.is_keyword(keyword))
                            || (starts_with_do && next.is_keyword("while"));
                        if !continues {
                            break index + 1;
                        }
                    }
                }
                _ => {}
            }
            index += 1;
        };

        trace!(
            offset = self.tokens[start].start,
            "keeping unmodeled code verbatim"
        );
        let text = self.text(start, end);
        self.pos = end;
        Ok(self.ast.alloc(Node::new(NodeKind::Verbatim(text))))
    }
}

/// Comments between two tokens with no blank line inside.
struct CommentRun {
    start: usize,
    end: usize,
    /// Starts on the line of the preceding token.
    same_line: bool,
    blank_before: bool,
    blank_after: bool,
}

/// Interpret a whole token slice as a literal, or `None` when any part of it
/// is not a literal.
fn literal_expr(tokens: &[Token]) -> Option<Expr> {
    let mut cursor = 0;
    let expr = literal(tokens, &mut cursor)?;
    (cursor == tokens.len()).then_some(expr)
}

fn literal(tokens: &[Token], cursor: &mut usize) -> Option<Expr> {
    let token = tokens.get(*cursor)?;
    *cursor += 1;
    match &token.kind {
        TokenKind::Int(value) => Some(Expr::Int(*value)),
        TokenKind::Float(value) => Some(Expr::Float(*value)),
        TokenKind::Str(Some(value)) => Some(Expr::String(value.clone())),
        TokenKind::Punct('-') => {
            let next = tokens.get(*cursor)?;
            *cursor += 1;
            match next.kind {
                TokenKind::Int(value) => value.checked_neg().map(Expr::Int),
                TokenKind::Float(value) => Some(Expr::Float(-value)),
                _ => None,
            }
        }
        TokenKind::Punct('[') => array_literal(tokens, cursor, ']'),
        TokenKind::Ident(name) => match name.to_ascii_lowercase().as_str() {
            "null" => Some(Expr::Null),
            "true" => Some(Expr::Bool(true)),
            "false" => Some(Expr::Bool(false)),
            "array" if tokens.get(*cursor).is_some_and(|t| t.is_punct('(')) => {
                *cursor += 1;
                array_literal(tokens, cursor, ')')
            }
            _ => {
                let member = tokens.get(*cursor + 1).and_then(|t| match &t.kind {
                    TokenKind::Ident(member) => Some(member),
                    _ => None,
                });
                match (tokens.get(*cursor).map(|t| &t.kind), member) {
                    (Some(TokenKind::DoubleColon), Some(member)) => {
                        *cursor += 2;
                        Some(Expr::class_const(name.clone(), member.clone()))
                    }
                    _ => Some(Expr::Const(name.clone())),
                }
            }
        },
        _ => None,
    }
}

fn array_literal(tokens: &[Token], cursor: &mut usize, close: char) -> Option<Expr> {
    let mut items = Vec::new();
    loop {
        if tokens.get(*cursor)?.is_punct(close) {
            *cursor += 1;
            return Some(Expr::Array(items));
        }
        let first = literal(tokens, cursor)?;
        let item = if tokens
            .get(*cursor)
            .is_some_and(|t| t.kind == TokenKind::DoubleArrow)
        {
            *cursor += 1;
            ArrayItem::keyed(first, literal(tokens, cursor)?)
        } else {
            ArrayItem::value(first)
        };
        items.push(item);

        let separator = tokens.get(*cursor)?;
        if separator.is_punct(',') {
            *cursor += 1;
        } else if !separator.is_punct(close) {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeCategory;

    fn parse(src: &str) -> Ast {
        PhpParser.parse(src).unwrap()
    }

    fn first_class(ast: &Ast) -> NodeId {
        ast.children(ast.scope())
            .iter()
            .copied()
            .find(|&id| ast.category(id).is_class_like())
            .unwrap()
    }

    #[test]
    fn test_empty_source() {
        assert!(parse("").is_empty());
        assert!(parse("<?php\n").is_empty());
    }

    #[test]
    fn test_declare_namespace_and_imports() {
        let ast = parse(
            "<?php\ndeclare(strict_types=1);\nnamespace App\\Model;\nuse Foo\\Bar, Baz as Qux;\n",
        );
        let root = ast.children(ast.root());
        assert_eq!(root.len(), 2);
        assert_eq!(
            ast.kind(root[0]),
            &NodeKind::Declare {
                key: "strict_types".into(),
                value: Expr::Int(1)
            }
        );

        let ns = ast.namespace().unwrap();
        assert_eq!(ast.node(ns).name(), Some("App\\Model"));
        let uses: Vec<_> = ast.children_of(ns, NodeCategory::Use).collect();
        assert_eq!(uses.len(), 2);
        assert_eq!(
            ast.kind(uses[1]),
            &NodeKind::Use {
                name: "Baz".into(),
                alias: Some("Qux".into())
            }
        );
    }

    #[test]
    fn test_class_header() {
        let ast = parse("<?php final class Foo extends Base implements \\Iterator, Bar {}");
        let NodeKind::Class(decl) = ast.kind(first_class(&ast)) else {
            panic!("expected class");
        };
        assert_eq!(decl.name.as_deref(), Some("Foo"));
        assert!(decl.modifiers.is_final());
        assert_eq!(decl.extends.as_deref(), Some("Base"));
        assert_eq!(decl.implements, vec!["\\Iterator", "Bar"]);
    }

    #[test]
    fn test_class_members() {
        let ast = parse(
            r#"<?php
class Foo
{
    use A, B;

    const X = 1, Y = 'y';
    /** The bar. */
    protected ?int $bar = null;

    #[Pure]
    public static function make(int $a = 1, string ...$rest): static
    {
        return new static();
    }
}
"#,
        );
        let class = first_class(&ast);
        let kinds: Vec<_> = ast
            .children(class)
            .iter()
            .map(|&id| ast.category(id))
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeCategory::TraitUse,
                NodeCategory::Constant,
                NodeCategory::Constant,
                NodeCategory::Property,
                NodeCategory::Method,
            ]
        );

        let property = ast.node(ast.children(class)[3]);
        assert_eq!(property.doc.as_deref(), Some("/** The bar. */"));
        let NodeKind::Property(decl) = &property.kind else {
            panic!("expected property");
        };
        assert_eq!(decl.ty, Some(TypeHint::nullable("int")));
        assert_eq!(decl.default, Some(Expr::Null));

        let method = ast.node(ast.children(class)[4]);
        assert_eq!(method.attributes, vec![Attribute::new("Pure")]);
        let NodeKind::Method(decl) = &method.kind else {
            panic!("expected method");
        };
        assert_eq!(decl.params.len(), 2);
        assert_eq!(decl.params[0].default, Some(Expr::Int(1)));
        assert!(decl.params[1].variadic);
        assert_eq!(
            decl.body.as_ref().unwrap().lines(),
            &["return new static();"]
        );
    }

    #[test]
    fn test_unmodeled_code_is_verbatim() {
        let ast = parse("<?php\nfunction helper() {\n    return 1;\n}\nenum Suit { case Hearts; }\n");
        let children = ast.children(ast.root());
        assert_eq!(children.len(), 2);
        assert_eq!(
            ast.kind(children[0]),
            &NodeKind::Verbatim("function helper() {\n    return 1;\n}".into())
        );
    }

    #[test]
    fn test_comments_are_attached_or_kept_alone() {
        let ast = parse(
            r#"<?php

// file note

namespace App; // app code

// keep me
/** Foo. */
class Foo
{
    # hash note

    const A = 1; // first
    /* about B */
    const B = 2;
    // closing note
}
"#,
        );
        let root = ast.children(ast.root());
        assert_eq!(ast.kind(root[0]), &NodeKind::Verbatim("// file note".into()));

        let ns = ast.namespace().unwrap();
        assert_eq!(ast.node(ns).trailing_comment.as_deref(), Some(" // app code"));

        let class = ast.node(first_class(&ast));
        assert_eq!(class.comment.as_deref(), Some("// keep me"));
        assert_eq!(class.doc.as_deref(), Some("/** Foo. */"));

        let members = &class.children;
        assert_eq!(members.len(), 3);
        assert_eq!(ast.kind(members[0]), &NodeKind::Verbatim("# hash note".into()));
        assert_eq!(ast.node(members[1]).trailing_comment.as_deref(), Some(" // first"));
        let b = ast.node(members[2]);
        assert_eq!(b.comment.as_deref(), Some("/* about B */"));
        assert_eq!(
            b.trailing_comment.as_deref(),
            Some("\n    // closing note")
        );
    }

    #[test]
    fn test_trait_use_with_adaptations() {
        let ast = parse("<?php class Foo { use A, B { A::hello insteadof B; B::hello as greet; } }");
        let class = first_class(&ast);
        let NodeKind::TraitUse {
            traits,
            adaptations,
        } = ast.kind(ast.children(class)[0])
        else {
            panic!("expected trait use");
        };
        assert_eq!(traits, &["A", "B"]);
        assert_eq!(
            adaptations.as_ref().unwrap().lines(),
            &["A::hello insteadof B; B::hello as greet;"]
        );
    }

    #[test]
    fn test_if_else_stays_one_statement() {
        let ast = parse("<?php if ($a) { foo(); } else { bar(); }");
        assert_eq!(ast.children(ast.root()).len(), 1);
    }

    #[test]
    fn test_non_literal_default_is_raw() {
        let ast = parse("<?php class A { public $x = self::BASE . 'x'; const Y = Foo::class; }");
        let class = first_class(&ast);
        let NodeKind::Property(decl) = ast.kind(ast.children(class)[0]) else {
            panic!("expected property");
        };
        assert_eq!(decl.default, Some(Expr::raw("self::BASE . 'x'")));
        let NodeKind::Constant(decl) = ast.kind(ast.children(class)[1]) else {
            panic!("expected constant");
        };
        assert_eq!(decl.value, Expr::class_const("Foo", "class"));
    }

    #[test]
    fn test_anonymous_class() {
        let ast = parse("<?php\nreturn new class extends Migration {\n    public function up(): void {}\n};\n");
        let class = ast.find_class_like(None).unwrap();
        let NodeKind::Class(decl) = ast.kind(class) else {
            panic!("expected class");
        };
        assert_eq!(decl.extends.as_deref(), Some("Migration"));
        assert_eq!(ast.children(class).len(), 1);
    }

    #[test]
    fn test_interface() {
        let ast = parse("<?php interface Shape extends A, B { public function area(): float; }");
        let NodeKind::Interface(decl) = ast.kind(first_class(&ast)) else {
            panic!("expected interface");
        };
        assert_eq!(decl.extends, vec!["A", "B"]);
    }

    #[test]
    fn test_unclosed_class_is_an_error() {
        let err = PhpParser.parse("<?php class Foo {").unwrap_err();
        assert_eq!(err.message(), "unclosed class body");
    }

    #[test]
    fn test_stray_brace_is_an_error() {
        assert!(PhpParser.parse("<?php }").is_err());
    }

    #[test]
    fn test_parse_body() {
        let body = PhpParser.parse_body("return $this->name;").unwrap();
        assert_eq!(body.lines(), &["return $this->name;"]);
        assert!(PhpParser.parse_body("if ($a) {").is_err());
    }
}
