use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, Token};
use std::ops::Range;

type Spanned<'src> = (Token<'src>, Range<usize>);

/// Parser for the top-level statements of an ES module.
///
/// Statements are recognized by their leading keywords. The engine only ever
/// looks at imports, exports, type aliases and variable bindings, so those
/// are read structurally; everything else is captured as verbatim source
/// text. A statement ends at a `;`, at the closing brace of a block
/// declaration, or before a statement keyword that starts a new line.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Spanned<'src>>,
    comments: Vec<Spanned<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let (comments, tokens) = tokenize(source)
            .into_iter()
            .partition(|(token, _)| token.is_comment());
        Self {
            source,
            tokens,
            comments,
            pos: 0,
        }
    }

    /// Parse a complete module.
    ///
    /// Blank lines between top-level items become [`Statement::Noop`] so that
    /// grouping survives a round trip.
    pub fn parse_module(&mut self) -> ParseResult<Module> {
        let mut module = Module::new();
        let mut next_comment = 0;
        let mut last_end = None;

        while !self.is_at_end() {
            if self.match_token(Token::Semicolon) {
                continue;
            }

            let start = self.peek_span().start;
            while let Some((token, span)) = self.comments.get(next_comment) {
                if span.start >= start {
                    break;
                }
                self.push_comment(&mut module, token, span, &mut last_end);
                next_comment += 1;
            }

            let statement = self.parse_statement()?;
            self.push_separator(&mut module, last_end, start);
            module.body.push(statement);
            last_end = Some(self.previous_end());

            // Comments inside a statement belong to its verbatim text
            let end = self.previous_end();
            while let Some((_, span)) = self.comments.get(next_comment) {
                if span.start >= end {
                    break;
                }
                next_comment += 1;
            }
        }

        for (token, span) in &self.comments[next_comment..] {
            self.push_comment(&mut module, token, span, &mut last_end);
        }

        Ok(module)
    }

    /// Comments before the first statement are header comments; later ones
    /// keep their place in the body.
    fn push_comment(
        &self,
        module: &mut Module,
        token: &Token,
        span: &Range<usize>,
        last_end: &mut Option<usize>,
    ) {
        if module.body.is_empty() {
            module.comments.push(to_comment(token));
            return;
        }
        self.push_separator(module, *last_end, span.start);
        module.body.push(Statement::Comment(to_comment(token)));
        *last_end = Some(span.end);
    }

    fn push_separator(&self, module: &mut Module, last_end: Option<usize>, start: usize) {
        let Some(end) = last_end else {
            return;
        };
        let gap = &self.source[end.min(start)..start];
        let lines: Vec<&str> = gap.split('\n').collect();
        let blank = lines.len() > 2 && lines[1..lines.len() - 1].iter().any(|l| l.trim().is_empty());
        if blank && !matches!(module.body.last(), Some(Statement::Noop)) {
            module.body.push(Statement::Noop);
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.peek_token() {
            Some(Token::Import)
                if !matches!(self.peek_token_at(1), Some(Token::LParen | Token::Dot)) =>
            {
                self.parse_import().map(Statement::Import)
            }
            Some(Token::Export) => self.parse_export(),
            _ if self.at_declaration() => self.parse_declaration().map(Statement::Declaration),
            _ => self.parse_raw(),
        }
    }

    /// Parse an import declaration
    fn parse_import(&mut self) -> ParseResult<ImportDeclaration> {
        self.expect(Token::Import)?;
        let kind = self.parse_import_kind();

        // Side-effect import: `import './polyfill';`
        if self.check(Token::String("")) {
            let source = self.expect_string()?;
            self.match_token(Token::Semicolon);
            return Ok(ImportDeclaration {
                kind,
                specifiers: Vec::new(),
                source,
            });
        }

        let mut specifiers = Vec::new();
        if self.check(Token::Star) {
            specifiers.push(self.parse_namespace_specifier()?);
        } else if self.check(Token::LBrace) {
            specifiers.extend(self.parse_named_import_specifiers()?);
        } else {
            let local = self.expect_name()?;
            specifiers.push(ImportSpecifier::Default { local });

            if self.match_token(Token::Comma) {
                if self.check(Token::Star) {
                    specifiers.push(self.parse_namespace_specifier()?);
                } else {
                    specifiers.extend(self.parse_named_import_specifiers()?);
                }
            }
        }

        self.expect(Token::From)?;
        let source = self.expect_string()?;
        self.match_token(Token::Semicolon);

        Ok(ImportDeclaration {
            kind,
            specifiers,
            source,
        })
    }

    /// `import type ...` / `import typeof ...`, but not a default import named `type`
    fn parse_import_kind(&mut self) -> BindingKind {
        let kind = match self.peek_token() {
            Some(Token::Type) => BindingKind::Type,
            Some(Token::Typeof) => BindingKind::Typeof,
            _ => return BindingKind::Value,
        };

        let is_kind = match self.peek_token_at(1) {
            Some(Token::LBrace | Token::Star) => true,
            Some(Token::From) => !matches!(self.peek_token_at(2), Some(Token::String(_))),
            Some(Token::Comma) => false,
            Some(token) => token.as_name().is_some(),
            None => false,
        };

        if is_kind {
            self.advance();
            kind
        } else {
            BindingKind::Value
        }
    }

    fn parse_namespace_specifier(&mut self) -> ParseResult<ImportSpecifier> {
        self.expect(Token::Star)?;
        self.expect(Token::As)?;
        let local = self.expect_name()?;
        Ok(ImportSpecifier::Namespace { local })
    }

    fn parse_named_import_specifiers(&mut self) -> ParseResult<Vec<ImportSpecifier>> {
        self.expect(Token::LBrace)?;

        let mut specifiers = Vec::new();
        while !self.check(Token::RBrace) && !self.is_at_end() {
            let kind = self.parse_specifier_kind();
            let imported = self.expect_name()?;
            let local = if self.match_token(Token::As) {
                self.expect_name()?
            } else {
                imported.clone()
            };
            specifiers.push(ImportSpecifier::Named {
                imported,
                local,
                kind,
            });

            if !self.match_token(Token::Comma) {
                break;
            }
        }

        self.expect(Token::RBrace)?;
        Ok(specifiers)
    }

    /// Inline kind of a single specifier, as in `{ type A, typeof B as C }`
    fn parse_specifier_kind(&mut self) -> Option<BindingKind> {
        let kind = match self.peek_token() {
            Some(Token::Type) => BindingKind::Type,
            Some(Token::Typeof) => BindingKind::Typeof,
            _ => return None,
        };

        // `{ type }` and `{ type as t }` import a binding literally named `type`
        let names_binding = match self.peek_token_at(1) {
            Some(Token::As) => matches!(self.peek_token_at(2), Some(t) if t.as_name().is_some())
                && !matches!(self.peek_token_at(3), Some(Token::Comma | Token::RBrace)),
            Some(token) => token.as_name().is_some(),
            None => false,
        };

        if names_binding {
            self.advance();
            Some(kind)
        } else {
            None
        }
    }

    /// Parse any `export ...` form
    fn parse_export(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        self.expect(Token::Export)?;

        match self.peek_token() {
            Some(Token::Default) => {
                self.advance();
                self.parse_export_default().map(Statement::ExportDefault)
            }
            Some(Token::Star) => self
                .parse_export_all(BindingKind::Value)
                .map(Statement::ExportAll),
            Some(Token::LBrace) => self
                .parse_export_specifiers(BindingKind::Value)
                .map(Statement::ExportNamed),
            Some(Token::Type) if matches!(self.peek_token_at(1), Some(Token::LBrace)) => {
                self.advance();
                self.parse_export_specifiers(BindingKind::Type)
                    .map(Statement::ExportNamed)
            }
            Some(Token::Type) if matches!(self.peek_token_at(1), Some(Token::Star)) => {
                self.advance();
                self.parse_export_all(BindingKind::Type)
                    .map(Statement::ExportAll)
            }
            _ if self.at_declaration() => {
                let declaration = self.parse_declaration()?;
                Ok(Statement::ExportNamed(ExportNamedDeclaration::declaration(
                    declaration,
                )))
            }
            _ => {
                // Export forms outside the module surface we model stay verbatim
                self.pos = start;
                self.parse_raw()
            }
        }
    }

    fn parse_export_default(&mut self) -> ParseResult<ExportDefaultDeclaration> {
        let start = self.pos;

        let is_block = match self.peek_token() {
            Some(Token::Function | Token::Class) => true,
            Some(Token::Async) => matches!(self.peek_token_at(1), Some(Token::Function)),
            _ => false,
        };

        if is_block {
            let end = self.block_extent(start)?;
            let text = self.text(start, end).to_string();
            self.pos = end;
            return Ok(ExportDefaultDeclaration {
                value: Expression::Raw { text },
            });
        }

        let (content_end, end) = self.statement_extent()?;
        if content_end == start {
            return Err(ParseError::unexpected_token(
                self.peek_span().start,
                "expression",
                Self::format_token(self.peek()),
            ));
        }
        let value = self.parse_expression_range(start, content_end);
        self.pos = end;
        Ok(ExportDefaultDeclaration { value })
    }

    fn parse_export_all(&mut self, kind: BindingKind) -> ParseResult<ExportAllDeclaration> {
        self.expect(Token::Star)?;
        let exported = if self.match_token(Token::As) {
            Some(self.expect_name()?)
        } else {
            None
        };
        self.expect(Token::From)?;
        let source = self.expect_string()?;
        self.match_token(Token::Semicolon);

        Ok(ExportAllDeclaration {
            kind,
            exported,
            source,
        })
    }

    fn parse_export_specifiers(&mut self, kind: BindingKind) -> ParseResult<ExportNamedDeclaration> {
        self.expect(Token::LBrace)?;

        let mut specifiers = Vec::new();
        while !self.check(Token::RBrace) && !self.is_at_end() {
            let local = self.expect_name()?;
            let exported = if self.match_token(Token::As) {
                self.expect_name()?
            } else {
                local.clone()
            };
            specifiers.push(ExportSpecifier { local, exported });

            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace)?;

        let source = if self.match_token(Token::From) {
            Some(self.expect_string()?)
        } else {
            None
        };
        self.match_token(Token::Semicolon);

        Ok(ExportNamedDeclaration {
            kind,
            declaration: None,
            specifiers,
            source,
        })
    }

    fn at_declaration(&self) -> bool {
        match self.peek_token() {
            Some(Token::Const | Token::Let | Token::Var | Token::Function | Token::Class) => true,
            Some(Token::Async) => matches!(self.peek_token_at(1), Some(Token::Function)),
            Some(Token::Type) => self.starts_type_alias(self.pos),
            Some(Token::Opaque) => matches!(self.peek_token_at(1), Some(Token::Type)),
            Some(Token::Interface) => {
                matches!(self.peek_token_at(1), Some(t) if t.as_name().is_some())
            }
            _ => false,
        }
    }

    /// `type Name =` or `type Name<`
    fn starts_type_alias(&self, index: usize) -> bool {
        let named = matches!(self.tokens.get(index + 1), Some((t, _)) if t.as_name().is_some());
        named
            && matches!(
                self.tokens.get(index + 2),
                Some((Token::Equals, _)) | Some((Token::Operator("<"), _))
            )
    }

    fn parse_declaration(&mut self) -> ParseResult<Declaration> {
        match self.peek_token() {
            Some(Token::Type) => self.parse_type_alias().map(Declaration::TypeAlias),
            Some(Token::Const | Token::Let | Token::Var) => {
                self.parse_variable().map(Declaration::Variable)
            }
            Some(Token::Opaque) => self.parse_verbatim(VerbatimKind::OpaqueType),
            Some(Token::Interface) => self.parse_verbatim(VerbatimKind::Interface),
            Some(Token::Class) => self.parse_verbatim(VerbatimKind::Class),
            Some(Token::Function | Token::Async) => self.parse_verbatim(VerbatimKind::Function),
            _ => Err(ParseError::unexpected_token(
                self.peek_span().start,
                "declaration",
                Self::format_token(self.peek()),
            )),
        }
    }

    /// Parse `type Name<Params> = Value`
    fn parse_type_alias(&mut self) -> ParseResult<TypeAlias> {
        self.expect(Token::Type)?;
        let name = self.expect_name()?;

        let type_params = if self.check(Token::Operator("<")) {
            let start = self.pos;
            let end = self.angle_extent(start)?;
            self.pos = end;
            Some(self.text(start, end).to_string())
        } else {
            None
        };

        self.expect(Token::Equals)?;
        let start = self.pos;
        let (content_end, end) = self.statement_extent()?;
        if content_end == start {
            return Err(ParseError::unexpected_token(
                self.peek_span().start,
                "type",
                Self::format_token(self.peek()),
            ));
        }

        let value = self.parse_type_range(start, content_end);
        self.pos = end;

        Ok(TypeAlias {
            name,
            type_params,
            value,
        })
    }

    /// Parse `const|let|var <declarator>, ...`
    fn parse_variable(&mut self) -> ParseResult<VariableDeclaration> {
        let kind = match self.peek_token() {
            Some(Token::Let) => VariableKind::Let,
            Some(Token::Var) => VariableKind::Var,
            _ => VariableKind::Const,
        };
        self.advance();

        let start = self.pos;
        let (content_end, end) = self.statement_extent()?;

        let mut declarators = Vec::new();
        for (from, to) in self.split_top_level(start, content_end, |t| *t == Token::Comma, false) {
            if from == to {
                continue;
            }
            declarators.push(self.parse_declarator(from, to)?);
        }

        if declarators.is_empty() {
            return Err(ParseError::unexpected_token(
                self.tokens.get(start).map(|(_, s)| s.start).unwrap_or(self.source.len()),
                "binding",
                Self::format_token(self.tokens.get(start)),
            ));
        }

        self.pos = end;
        Ok(VariableDeclaration { kind, declarators })
    }

    fn parse_declarator(&self, from: usize, to: usize) -> ParseResult<VariableDeclarator> {
        let (id, mut next) = match &self.tokens[from].0 {
            Token::LBrace | Token::LBracket => {
                let close = self.matching(from)?;
                let pattern = BindingPattern::Pattern {
                    text: self.text(from, close + 1).to_string(),
                    names: self.binding_names(from, close + 1),
                };
                (pattern, close + 1)
            }
            token => match token.as_name() {
                Some(name) => (
                    BindingPattern::Identifier {
                        name: name.to_string(),
                    },
                    from + 1,
                ),
                None => {
                    return Err(ParseError::unexpected_token(
                        self.tokens[from].1.start,
                        "binding",
                        token.to_string(),
                    ))
                }
            },
        };

        let equals = self.find_top_level(next, to, |t| *t == Token::Equals);

        let type_annotation = if next < to && self.tokens[next].0 == Token::Colon {
            let type_end = equals.unwrap_or(to);
            let annotation = self.parse_type_range(next + 1, type_end);
            next = type_end;
            Some(annotation)
        } else {
            None
        };

        let init = match equals {
            Some(eq) if eq >= next && eq + 1 < to => Some(self.parse_expression_range(eq + 1, to)),
            Some(eq) if eq >= next => {
                return Err(ParseError::unexpected_token(
                    self.tokens[eq].1.end,
                    "expression",
                    Self::format_token(self.tokens.get(to)),
                ))
            }
            _ => None,
        };

        Ok(VariableDeclarator {
            id,
            type_annotation,
            init,
        })
    }

    /// Names bound by a (possibly destructuring) binding in `from..to`
    fn binding_names(&self, from: usize, to: usize) -> Vec<String> {
        let to = self
            .find_top_level(from, to, |t| *t == Token::Equals)
            .unwrap_or(to);
        if from >= to {
            return Vec::new();
        }

        match &self.tokens[from].0 {
            Token::Ellipsis => self.binding_names(from + 1, to),
            open @ (Token::LBrace | Token::LBracket) => {
                let is_object = *open == Token::LBrace;
                let close = to - 1;
                let mut names = Vec::new();
                for (s, e) in self.split_top_level(from + 1, close, |t| *t == Token::Comma, false) {
                    if s == e {
                        continue;
                    }
                    let target = if is_object {
                        self.find_top_level(s, e, |t| *t == Token::Colon)
                            .map(|colon| colon + 1)
                            .unwrap_or(s)
                    } else {
                        s
                    };
                    names.extend(self.binding_names(target, e));
                }
                names
            }
            token => token
                .as_name()
                .map(|name| vec![name.to_string()])
                .unwrap_or_default(),
        }
    }

    /// Parse a declaration kept as text: function, class, interface, opaque type
    fn parse_verbatim(&mut self, kind: VerbatimKind) -> ParseResult<Declaration> {
        let start = self.pos;

        match kind {
            VerbatimKind::Function => {
                self.match_token(Token::Async);
                self.expect(Token::Function)?;
                self.match_token(Token::Star);
            }
            VerbatimKind::Class => self.expect(Token::Class)?,
            VerbatimKind::Interface => self.expect(Token::Interface)?,
            VerbatimKind::OpaqueType => {
                self.expect(Token::Opaque)?;
                self.expect(Token::Type)?;
            }
        }
        let name = self.expect_name()?;

        let (content_end, end) = if kind == VerbatimKind::OpaqueType {
            self.pos = start;
            self.statement_extent()?
        } else {
            let end = self.block_extent(start)?;
            (end, end)
        };

        let text = self.text(start, content_end).to_string();
        self.pos = end;

        Ok(Declaration::Verbatim(VerbatimDeclaration { kind, name, text }))
    }

    /// Any statement we do not model
    fn parse_raw(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        let (_, end) = self.statement_extent()?;
        let text = self.text(start, end).to_string();
        self.pos = end.max(start + 1);
        Ok(Statement::Raw { text })
    }

    /// Read a type annotation occupying `from..to`
    fn parse_type_range(&self, from: usize, to: usize) -> TypeAnnotation {
        if let Some(name) = self.dotted_name(from, to) {
            return TypeAnnotation::Generic { name };
        }

        if let Some(object) = self.object_type(from, to) {
            return TypeAnnotation::Object(object);
        }

        TypeAnnotation::Raw {
            text: self.text(from, to).to_string(),
        }
    }

    /// `{ key: Type, key?: Type }` or `{| ... |}`; anything fancier stays raw
    fn object_type(&self, from: usize, to: usize) -> Option<ObjectType> {
        if to <= from + 1 || self.tokens[from].0 != Token::LBrace {
            return None;
        }
        if self.matching(from).ok()? != to - 1 {
            return None;
        }

        let (mut inner_start, mut inner_end) = (from + 1, to - 1);
        let exact = inner_end > inner_start + 1
            && self.tokens[inner_start].0 == Token::Pipe
            && self.tokens[inner_end - 1].0 == Token::Pipe;
        if exact {
            inner_start += 1;
            inner_end -= 1;
        }

        let mut properties = Vec::new();
        let is_separator = |t: &Token<'src>| matches!(t, Token::Comma | Token::Semicolon);
        for (s, e) in self.split_top_level(inner_start, inner_end, is_separator, true) {
            if s == e {
                continue;
            }

            let key = self.tokens[s].0.as_name()?.to_string();
            let mut colon = s + 1;
            let optional = colon < e && self.tokens[colon].0 == Token::Question;
            if optional {
                colon += 1;
            }
            if colon >= e || self.tokens[colon].0 != Token::Colon || colon + 1 >= e {
                return None;
            }

            properties.push(ObjectTypeProperty {
                key,
                optional,
                value: self.parse_type_range(colon + 1, e),
            });
        }

        Some(ObjectType { exact, properties })
    }

    /// Read an expression occupying `from..to`
    fn parse_expression_range(&self, from: usize, to: usize) -> Expression {
        if to == from + 1 {
            if let Token::Ident(name) = &self.tokens[from].0 {
                return Expression::Identifier {
                    name: name.to_string(),
                };
            }
        }

        if let Some(properties) = self.object_literal(from, to) {
            return Expression::Object { properties };
        }

        Expression::Raw {
            text: self.text(from, to).to_string(),
        }
    }

    /// `{ key: value, shorthand }`; spreads, computed keys and methods stay raw
    fn object_literal(&self, from: usize, to: usize) -> Option<Vec<ObjectProperty>> {
        if to <= from + 1 || self.tokens[from].0 != Token::LBrace {
            return None;
        }
        if self.matching(from).ok()? != to - 1 {
            return None;
        }

        let mut properties = Vec::new();
        for (s, e) in self.split_top_level(from + 1, to - 1, |t| *t == Token::Comma, false) {
            if s == e {
                continue;
            }

            let key = self.tokens[s].0.as_name()?.to_string();
            if e == s + 1 {
                properties.push(ObjectProperty {
                    value: Expression::Identifier { name: key.clone() },
                    key,
                    shorthand: true,
                });
                continue;
            }

            if self.tokens[s + 1].0 != Token::Colon || s + 2 >= e {
                return None;
            }
            properties.push(ObjectProperty {
                key,
                value: self.parse_expression_range(s + 2, e),
                shorthand: false,
            });
        }

        Some(properties)
    }

    /// `Name` or `Namespace.Name` spanning exactly `from..to`
    fn dotted_name(&self, from: usize, to: usize) -> Option<String> {
        if from >= to || (to - from) % 2 == 0 {
            return None;
        }

        let mut name = String::new();
        for (offset, (token, _)) in self.tokens[from..to].iter().enumerate() {
            if offset % 2 == 0 {
                name.push_str(token.as_name()?);
            } else if *token == Token::Dot {
                name.push('.');
            } else {
                return None;
            }
        }
        Some(name)
    }

    /// Extent of the statement starting at the cursor.
    ///
    /// Returns `(content_end, end)`: `content_end` excludes a terminating
    /// semicolon, `end` includes it.
    fn statement_extent(&self) -> ParseResult<(usize, usize)> {
        let mut stack: Vec<usize> = Vec::new();
        let mut i = self.pos;

        while i < self.tokens.len() {
            let token = &self.tokens[i].0;

            if stack.is_empty() {
                if *token == Token::Semicolon {
                    return Ok((i, i + 1));
                }
                if i > self.pos && self.newline_before(i) && self.starts_statement(i) {
                    return Ok((i, i));
                }
            }

            if token.opens_group() {
                stack.push(i);
            } else if token.closes_group() {
                match stack.pop() {
                    Some(open) if closes(&self.tokens[open].0, token) => {}
                    _ => {
                        return Err(ParseError::unbalanced(
                            self.tokens[i].1.start,
                            token.to_string(),
                        ))
                    }
                }
            }

            i += 1;
        }

        if let Some(open) = stack.pop() {
            return Err(ParseError::unbalanced(
                self.tokens[open].1.start,
                self.tokens[open].0.to_string(),
            ));
        }

        Ok((i, i))
    }

    /// End (exclusive) of a declaration whose body is a brace block
    fn block_extent(&self, start: usize) -> ParseResult<usize> {
        let mut depth = 0usize;
        let mut i = start;

        while i < self.tokens.len() {
            let token = &self.tokens[i].0;

            if depth == 0 && *token == Token::LBrace {
                let close = self.matching(i)?;
                // A return type annotation such as `): { a: number } {`
                let is_annotation = i > start && self.tokens[i - 1].0 == Token::Colon;
                if !is_annotation {
                    return Ok(close + 1);
                }
                i = close + 1;
                continue;
            }

            if token.opens_group() {
                depth += 1;
            } else if token.closes_group() {
                if depth == 0 {
                    return Err(ParseError::unbalanced(
                        self.tokens[i].1.start,
                        token.to_string(),
                    ));
                }
                depth -= 1;
            }
            i += 1;
        }

        Err(ParseError::unexpected_eof(self.source.len()))
    }

    /// End (exclusive) of a `<...>` type parameter list starting at `start`
    fn angle_extent(&self, start: usize) -> ParseResult<usize> {
        let mut depth = 0usize;
        for i in start..self.tokens.len() {
            match &self.tokens[i].0 {
                Token::Operator("<") => depth += 1,
                Token::Operator(">") => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(i + 1);
                    }
                }
                _ => {}
            }
        }
        Err(ParseError::unbalanced(self.tokens[start].1.start, "<"))
    }

    /// Index of the closing token matching the group opened at `open`
    fn matching(&self, open: usize) -> ParseResult<usize> {
        let mut depth = 0usize;
        for i in open..self.tokens.len() {
            let token = &self.tokens[i].0;
            if token.opens_group() {
                depth += 1;
            } else if token.closes_group() {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(i);
                }
            }
        }
        Err(ParseError::unbalanced(
            self.tokens[open].1.start,
            self.tokens[open].0.to_string(),
        ))
    }

    /// Split `from..to` at separators that are not nested in a group
    fn split_top_level(
        &self,
        from: usize,
        to: usize,
        is_separator: impl Fn(&Token<'src>) -> bool,
        track_angles: bool,
    ) -> Vec<(usize, usize)> {
        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut part_start = from;

        for i in from..to {
            let token = &self.tokens[i].0;
            if token.opens_group() || (track_angles && *token == Token::Operator("<")) {
                depth += 1;
            } else if token.closes_group() || (track_angles && *token == Token::Operator(">")) {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && is_separator(token) {
                parts.push((part_start, i));
                part_start = i + 1;
            }
        }

        if part_start <= to {
            parts.push((part_start, to));
        }
        parts
    }

    /// First index in `from..to` matching `pred` outside any group
    fn find_top_level(
        &self,
        from: usize,
        to: usize,
        pred: impl Fn(&Token<'src>) -> bool,
    ) -> Option<usize> {
        let mut depth = 0usize;
        for i in from..to {
            let token = &self.tokens[i].0;
            if token.opens_group() {
                depth += 1;
            } else if token.closes_group() {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && pred(token) {
                return Some(i);
            }
        }
        None
    }

    /// Whether the token at `index` begins a new top-level statement
    fn starts_statement(&self, index: usize) -> bool {
        let next = self.tokens.get(index + 1).map(|(t, _)| t);
        match &self.tokens[index].0 {
            Token::Import => !matches!(next, Some(Token::LParen | Token::Dot)),
            Token::Export | Token::Const | Token::Let | Token::Var => true,
            Token::Function | Token::Class | Token::Interface | Token::Opaque => true,
            Token::Async => matches!(next, Some(Token::Function)),
            Token::Type => self.starts_type_alias(index),
            _ => false,
        }
    }

    fn newline_before(&self, index: usize) -> bool {
        index > 0
            && self.source[self.tokens[index - 1].1.end..self.tokens[index].1.start].contains('\n')
    }

    /// Source text covered by the tokens `from..to`
    fn text(&self, from: usize, to: usize) -> &'src str {
        if from >= to {
            return "";
        }
        &self.source[self.tokens[from].1.start..self.tokens[to - 1].1.end]
    }

    // Helper methods

    fn peek(&self) -> Option<&Spanned<'src>> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token<'src>> {
        self.peek().map(|(t, _)| t)
    }

    fn peek_token_at(&self, offset: usize) -> Option<&Token<'src>> {
        self.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<&Spanned<'src>> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: Token<'src>) -> bool {
        if let Some((t, _)) = self.peek() {
            std::mem::discriminant(t) == std::mem::discriminant(&token)
                && (!matches!(token, Token::Operator(_)) || *t == token)
        } else {
            false
        }
    }

    fn match_token(&mut self, token: Token<'src>) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token<'src>) -> ParseResult<()> {
        if self.check(token.clone()) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected_token(
                self.peek_span().start,
                token.to_string(),
                Self::format_token(self.peek()),
            ))
        }
    }

    fn expect_name(&mut self) -> ParseResult<String> {
        match self.peek_token().and_then(|t| t.as_name()) {
            Some(name) => {
                self.advance();
                Ok(name.to_string())
            }
            None => Err(ParseError::unexpected_token(
                self.peek_span().start,
                "identifier",
                Self::format_token(self.peek()),
            )),
        }
    }

    fn expect_string(&mut self) -> ParseResult<String> {
        match self.peek_token() {
            Some(Token::String(s)) => {
                let val = s[1..s.len() - 1].to_string();
                self.advance();
                Ok(val)
            }
            _ => Err(ParseError::unexpected_token(
                self.peek_span().start,
                "string literal",
                Self::format_token(self.peek()),
            )),
        }
    }

    fn previous_end(&self) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|(_, span)| span.end)
            .unwrap_or(0)
    }

    /// Get the span of the next token (the one we're about to consume)
    fn peek_span(&self) -> Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.clone())
            .unwrap_or_else(|| {
                // If we're at EOF, use the end of the last token
                let end = self.tokens.last().map(|(_, span)| span.end).unwrap_or(0);
                end..end
            })
    }

    /// Format a token for display in error messages
    fn format_token(token: Option<&Spanned>) -> String {
        match token {
            None => "end of file".to_string(),
            Some((token, _)) => token.to_string(),
        }
    }
}

fn closes(open: &Token, close: &Token) -> bool {
    matches!(
        (open, close),
        (Token::LBrace, Token::RBrace) | (Token::LParen, Token::RParen) | (Token::LBracket, Token::RBracket)
    )
}

fn to_comment(token: &Token) -> Comment {
    match token {
        Token::BlockComment(text) => Comment::block(&text[2..text.len() - 2]),
        Token::LineComment(text) => Comment::line(&text[2..]),
        other => Comment::line(other.to_string()),
    }
}

pub fn parse(source: &str) -> ParseResult<Module> {
    let mut parser = Parser::new(source);
    parser.parse_module()
}
