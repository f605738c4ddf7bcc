use std::fmt;

use crate::ast::{
    BlockBody, BlockStatement, CommandBody, CommandDef, CommandText, CommandTextElement,
    DecoratedBody, Decorator, DecoratorContent, DecoratorElement, DecoratorForm, Modifier,
    Program, SimpleCommand, TopLevelItem, VariableDef,
};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::source::SourceFile;
use crate::token::{Span, Token, TokenKind};

/// Blocks and parenthesised decorator arguments nest at most this deep.
const MAX_NESTING_DEPTH: usize = 128;

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A specific token was required.
    Expected {
        expected: &'static str,
        found: TokenKind,
    },
    /// A line starts with something other than `def`, `watch`,
    /// `stop`, or a command name.
    ExpectedDefinition { found: TokenKind },
    /// Tokens left on the line after a complete definition.
    TrailingTokens { found: TokenKind },
    /// Two block statements on separate lines without `;`.
    MissingSeparator,
    /// `{` without a matching `}`.
    UnclosedBlock,
    /// Decorator arguments without a matching `)`.
    UnclosedParen,
    NestingTooDeep { limit: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::ExpectedDefinition { found } => {
                write!(
                    f,
                    "expected a variable or command definition, found {found}"
                )
            }
            Self::TrailingTokens { found } => {
                write!(f, "unexpected {found} after definition")
            }
            Self::MissingSeparator => {
                write!(f, "expected ';' between block statements")
            }
            Self::UnclosedBlock => write!(f, "unclosed block, expected '}}'"),
            Self::UnclosedParen => {
                write!(f, "unclosed decorator arguments, expected ')'")
            }
            Self::NestingTooDeep { limit } => {
                write!(f, "nesting deeper than {limit} levels")
            }
        }
    }
}

impl Diagnostic {
    /// Build a `ParseError` diagnostic.
    #[must_use]
    pub fn parse(kind: &ParseErrorKind, span: Span) -> Self {
        Self::new(DiagnosticCode::ParseError, kind.to_string(), span)
    }
}

/// Parse a token stream from [`tokenize`](crate::tokenize) into a
/// [`Program`].
///
/// Hidden-channel tokens are skipped. Errors are recorded as
/// diagnostics and the parser resynchronises, so a program is
/// always returned.
#[must_use]
#[tracing::instrument(skip_all, fields(source = source.name(), token_count = tokens.len()))]
pub fn parse_tokens(source: &SourceFile, tokens: &[Token<'_>]) -> (Program, Vec<Diagnostic>) {
    let mut parser = Parser::new(source, tokens);
    let program = parser.parse_program();
    tracing::debug!(
        items = program.items.len(),
        errors = parser.diagnostics.len(),
        "parsed program"
    );
    (program, parser.diagnostics)
}

/// A diagnostic has been recorded; unwind to the nearest recovery point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Failed;

type PResult<T> = Result<T, Failed>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    TopLevel,
    Block,
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    last: Span,
    diagnostics: usize,
}

struct Parser<'a> {
    source: &'a SourceFile,
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// Span of the most recently consumed token.
    last: Span,
    depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a SourceFile, tokens: &[Token<'a>]) -> Self {
        let mut visible: Vec<Token<'a>> = tokens.iter().filter(|t| !t.is_hidden()).copied().collect();
        if visible.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            visible.push(Token {
                kind: TokenKind::Eof,
                text: "",
                span: source.eof_span(),
            });
        }
        Self {
            source,
            tokens: visible,
            pos: 0,
            last: source.span(0, 0),
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    // -- Top level --

    fn parse_program(&mut self) -> Program {
        let mut items = Vec::new();

        loop {
            let tok = self.peek();
            let errors_before = self.diagnostics.len();

            let item = match tok.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.bump();
                    items.push(TopLevelItem::BlankLine(tok.span));
                    continue;
                }
                // `watch: ...` defines a plain command called "watch"
                TokenKind::Def | TokenKind::Watch | TokenKind::Stop
                    if self.nth(1).kind == TokenKind::Colon =>
                {
                    self.parse_command(Modifier::None).map(TopLevelItem::Command)
                }
                TokenKind::Def => self.parse_variable().map(TopLevelItem::Variable),
                TokenKind::Watch => self.parse_command(Modifier::Watch).map(TopLevelItem::Command),
                TokenKind::Stop => self.parse_command(Modifier::Stop).map(TopLevelItem::Command),
                TokenKind::Name => self.parse_command(Modifier::None).map(TopLevelItem::Command),
                found => Err(self.error(ParseErrorKind::ExpectedDefinition { found }, tok.span)),
            };

            match item {
                Ok(item) => {
                    items.push(item);
                    self.finish_line(errors_before);
                }
                Err(Failed) => self.synchronize_line(),
            }
        }

        Program { items }
    }

    fn parse_variable(&mut self) -> PResult<VariableDef> {
        let errors_before = self.diagnostics.len();
        let def = self.bump();
        let name = self.expect(TokenKind::Name, "variable name")?;
        self.expect(TokenKind::Equals, "'='")?;
        let value = self.parse_command_text(Context::TopLevel)?;
        self.expect_semicolon();

        Ok(VariableDef {
            name: name.text.to_string(),
            name_span: name.span,
            value,
            span: def.span.merge(self.last),
            malformed: self.diagnostics.len() > errors_before,
        })
    }

    fn parse_command(&mut self, modifier: Modifier) -> PResult<CommandDef> {
        let errors_before = self.diagnostics.len();
        let head = self.peek();

        let name = if modifier == Modifier::None && head.kind != TokenKind::Name {
            self.bump()
        } else {
            if modifier != Modifier::None {
                self.bump();
            }
            self.expect_name("command name")?
        };
        self.expect(TokenKind::Colon, "':'")?;
        let body = self.parse_command_body()?;

        Ok(CommandDef {
            modifier,
            name: name.text.to_string(),
            name_span: name.span,
            body,
            span: head.span.merge(self.last),
            malformed: self.diagnostics.len() > errors_before,
        })
    }

    fn parse_command_body(&mut self) -> PResult<CommandBody> {
        match self.peek().kind {
            TokenKind::At => match self.parse_decorated_or_simple(Context::TopLevel)? {
                BlockStatement::Decorated(decorated) => {
                    if ends_in_simple_command(&decorated) {
                        self.expect_semicolon();
                    } else {
                        self.eat(TokenKind::Semicolon);
                    }
                    Ok(CommandBody::Decorated(decorated))
                }
                BlockStatement::Plain(simple) => {
                    self.expect_semicolon();
                    Ok(CommandBody::Simple(simple))
                }
            },
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                self.eat(TokenKind::Semicolon);
                Ok(CommandBody::Block(block))
            }
            _ => {
                let simple = self.parse_simple(Context::TopLevel)?;
                self.expect_semicolon();
                Ok(CommandBody::Simple(simple))
            }
        }
    }

    /// After a definition only a line break or end of input may follow.
    fn finish_line(&mut self, errors_before: usize) {
        let tok = self.peek();
        match tok.kind {
            TokenKind::Newline => {
                self.bump();
            }
            TokenKind::Eof => {}
            found => {
                if self.diagnostics.len() == errors_before {
                    self.error(ParseErrorKind::TrailingTokens { found }, tok.span);
                }
                self.synchronize_line();
            }
        }
    }

    /// Discard tokens through the next line break outside braces.
    fn synchronize_line(&mut self) {
        let from = self.peek().span;
        let mut braces = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::Newline if braces == 0 => {
                    self.bump();
                    break;
                }
                TokenKind::LBrace => braces += 1,
                TokenKind::RBrace => braces = braces.saturating_sub(1),
                _ => {}
            }
            self.bump();
        }
        tracing::trace!(from = %from, to = %self.last, "resynchronised at line boundary");
    }

    // -- Blocks --

    fn parse_block(&mut self) -> PResult<BlockBody> {
        let span = self.peek().span;
        self.nested(span, Self::parse_block_inner)
    }

    fn parse_block_inner(&mut self) -> PResult<BlockBody> {
        let open = self.expect(TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();

        loop {
            let tok = self.peek();
            match tok.kind {
                TokenKind::RBrace => {
                    self.bump();
                    break;
                }
                TokenKind::Eof => {
                    let diagnostic = Diagnostic::parse(&ParseErrorKind::UnclosedBlock, tok.span)
                        .with_note(open.span, "block opened here");
                    self.diagnostics.push(diagnostic);
                    break;
                }
                TokenKind::Newline | TokenKind::Semicolon => {
                    self.bump();
                    continue;
                }
                _ => {}
            }

            let before = self.pos;
            match self.parse_block_statement() {
                Ok(_) if self.pos == before => {
                    self.error(
                        ParseErrorKind::Expected {
                            expected: "command",
                            found: tok.kind,
                        },
                        tok.span,
                    );
                    self.recover_in_block();
                }
                Ok(statement) => {
                    let after_block = ends_in_block(&statement);
                    statements.push(statement);
                    self.finish_statement(after_block);
                }
                Err(Failed) => self.recover_in_block(),
            }
        }

        Ok(BlockBody {
            statements,
            span: open.span.merge(self.last),
        })
    }

    fn parse_block_statement(&mut self) -> PResult<BlockStatement> {
        if self.at(TokenKind::At) {
            self.parse_decorated_or_simple(Context::Block)
        } else {
            self.parse_simple(Context::Block).map(BlockStatement::Plain)
        }
    }

    fn finish_statement(&mut self, after_block: bool) {
        let tok = self.peek();
        match tok.kind {
            TokenKind::Semicolon => {
                self.bump();
            }
            TokenKind::RBrace | TokenKind::Eof => {}
            TokenKind::Newline => {
                let mut n = 0;
                while self.nth(n).kind == TokenKind::Newline {
                    n += 1;
                }
                let closes = matches!(self.nth(n).kind, TokenKind::RBrace | TokenKind::Eof);
                if !after_block && !closes {
                    self.error(ParseErrorKind::MissingSeparator, tok.span);
                }
            }
            found => {
                if !after_block {
                    self.error(
                        ParseErrorKind::Expected {
                            expected: "';'",
                            found,
                        },
                        tok.span,
                    );
                    self.recover_in_block();
                }
            }
        }
    }

    /// Discard tokens through the end of the current block statement,
    /// stopping before the `}` that closes the enclosing block.
    fn recover_in_block(&mut self) {
        let from = self.peek().span;
        let mut braces = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::RBrace if braces == 0 => break,
                TokenKind::Semicolon | TokenKind::Newline if braces == 0 => {
                    self.bump();
                    break;
                }
                TokenKind::LBrace => braces += 1,
                TokenKind::RBrace => braces -= 1,
                _ => {}
            }
            self.bump();
        }
        tracing::trace!(from = %from, to = %self.last, "resynchronised inside block");
    }

    // -- Decorators --

    /// Parse a body or statement that starts with `@`.
    ///
    /// Falls back to a plain command when the `@` does not begin a
    /// decorator, or when `@name(args)` is followed by more command
    /// text (an inline decorator at the start of the line).
    fn parse_decorated_or_simple(&mut self, ctx: Context) -> PResult<BlockStatement> {
        let checkpoint = self.checkpoint();
        let at = self.bump();
        let name = self.peek();
        if !is_name_like(name.kind) || !adjacent(at, name) {
            self.restore(checkpoint);
            return self.parse_simple(ctx).map(BlockStatement::Plain);
        }
        self.bump();

        let has_parens = self.at(TokenKind::LParen);
        let args = if has_parens {
            let open = self.bump();
            self.parse_decorator_content(open)?
        } else {
            DecoratorContent::default()
        };
        let decorator_span = at.span.merge(self.last);

        let (form, inner) = match self.peek().kind {
            TokenKind::LBrace => (
                DecoratorForm::Block,
                Some(CommandBody::Block(self.parse_block()?)),
            ),
            TokenKind::Colon => {
                self.bump();
                match self.peek().kind {
                    TokenKind::LBrace => (
                        DecoratorForm::Block,
                        Some(CommandBody::Block(self.parse_block()?)),
                    ),
                    TokenKind::At => {
                        let chained = self.nested(at.span, |p| p.parse_decorated_or_simple(ctx))?;
                        let inner = match chained {
                            BlockStatement::Decorated(d) => CommandBody::Decorated(d),
                            BlockStatement::Plain(s) => CommandBody::Simple(s),
                        };
                        (DecoratorForm::Simple, Some(inner))
                    }
                    _ => (
                        DecoratorForm::Simple,
                        Some(CommandBody::Simple(self.parse_simple(ctx)?)),
                    ),
                }
            }
            _ if has_parens && self.at_statement_end(ctx) => (DecoratorForm::Function, None),
            _ => {
                self.restore(checkpoint);
                return self.parse_simple(ctx).map(BlockStatement::Plain);
            }
        };

        Ok(BlockStatement::Decorated(DecoratedBody {
            decorator: Decorator {
                name: name.text.to_string(),
                form,
                args,
                span: decorator_span,
            },
            inner: inner.map(Box::new),
            span: at.span.merge(self.last),
        }))
    }

    /// `@name(args)` embedded in command text or decorator arguments.
    fn parse_inline_decorator(&mut self) -> PResult<Decorator> {
        let at = self.bump();
        let name = self.bump();
        let open = self.bump();
        let args = self.parse_decorator_content(open)?;
        Ok(Decorator {
            name: name.text.to_string(),
            form: DecoratorForm::Function,
            args,
            span: at.span.merge(self.last),
        })
    }

    /// Parse arguments after `open` through the matching `)`.
    fn parse_decorator_content(&mut self, open: Token<'a>) -> PResult<DecoratorContent> {
        self.nested(open.span, |p| p.parse_decorator_content_inner(open))
    }

    fn parse_decorator_content_inner(&mut self, open: Token<'a>) -> PResult<DecoratorContent> {
        let mut elements = Vec::new();
        let mut run = TextRun::default();

        loop {
            let tok = self.peek();
            match tok.kind {
                TokenKind::RParen => {
                    self.push_arg_text(&mut elements, run.finish());
                    self.bump();
                    return Ok(DecoratorContent { elements });
                }
                TokenKind::Eof => {
                    let diagnostic = Diagnostic::parse(&ParseErrorKind::UnclosedParen, tok.span)
                        .with_note(open.span, "arguments opened here");
                    self.diagnostics.push(diagnostic);
                    return Err(Failed);
                }
                TokenKind::Newline => {
                    self.push_arg_text(&mut elements, run.finish());
                    self.bump();
                    elements.push(DecoratorElement::Newline(tok.span));
                    run = TextRun::default();
                }
                TokenKind::LParen => {
                    self.push_arg_text(&mut elements, run.take_before(tok.span));
                    let inner_open = self.bump();
                    let content = self.parse_decorator_content(inner_open)?;
                    elements.push(DecoratorElement::Group {
                        content,
                        span: inner_open.span.merge(self.last),
                    });
                    run.resume_after(self.last);
                }
                TokenKind::At if self.at_inline_decorator() => {
                    self.push_arg_text(&mut elements, run.take_before(tok.span));
                    let decorator = self.parse_inline_decorator()?;
                    elements.push(DecoratorElement::Nested(decorator));
                    run.resume_after(self.last);
                }
                _ => {
                    run.push(tok.span);
                    self.bump();
                }
            }
        }
    }

    // -- Command text --

    fn parse_simple(&mut self, ctx: Context) -> PResult<SimpleCommand> {
        let text = self.parse_command_text(ctx)?;
        let mut span = text.span;
        let mut continuations = Vec::new();

        while self.at(TokenKind::Backslash) && self.nth(1).kind == TokenKind::Newline {
            self.bump();
            self.bump();
            let continuation = self.parse_command_text(ctx)?;
            span = span.merge(continuation.span);
            continuations.push(continuation);
        }

        Ok(SimpleCommand {
            text,
            continuations,
            span,
        })
    }

    /// Parse command text up to `;`, a line break, a line
    /// continuation, or (inside a block) an unbalanced `}`.
    fn parse_command_text(&mut self, ctx: Context) -> PResult<CommandText> {
        let start = self.peek().span.start_point();
        let mut elements = Vec::new();
        let mut run = TextRun::default();
        let mut braces = 0usize;

        loop {
            let tok = self.peek();
            let structural = match tok.kind {
                TokenKind::Semicolon | TokenKind::Newline | TokenKind::Eof => {
                    self.push_literal(&mut elements, run.finish());
                    break;
                }
                TokenKind::RBrace if braces == 0 && ctx == Context::Block => {
                    self.push_literal(&mut elements, run.finish());
                    break;
                }
                // whitespace before the continuation stays with this line
                TokenKind::Backslash => {
                    self.push_literal(&mut elements, run.take_before(tok.span));
                    break;
                }
                TokenKind::VarRef => CommandTextElement::VarRef {
                    name: tok.var_name().unwrap_or_default().to_string(),
                    span: tok.span,
                },
                TokenKind::ShellVar => CommandTextElement::ShellVarRef {
                    name: tok.var_name().unwrap_or_default().to_string(),
                    span: tok.span,
                },
                kind if kind.is_escape() => CommandTextElement::EscapedChar {
                    ch: tok.escaped_char().unwrap_or('\\'),
                    span: tok.span,
                },
                TokenKind::At if self.at_inline_decorator() => {
                    self.push_literal(&mut elements, run.take_before(tok.span));
                    let decorator = self.parse_inline_decorator()?;
                    elements.push(CommandTextElement::InlineDecorator(decorator));
                    run.resume_after(self.last);
                    continue;
                }
                kind => {
                    match kind {
                        TokenKind::LBrace => braces += 1,
                        TokenKind::RBrace => braces = braces.saturating_sub(1),
                        _ => {}
                    }
                    run.push(tok.span);
                    self.bump();
                    continue;
                }
            };

            self.push_literal(&mut elements, run.take_before(tok.span));
            elements.push(structural);
            self.bump();
            run.resume_after(tok.span);
        }

        let span = match (elements.first(), elements.last()) {
            (Some(first), Some(last)) => first.span().merge(last.span()),
            _ => start,
        };
        Ok(CommandText { elements, span })
    }

    fn push_literal(&self, elements: &mut Vec<CommandTextElement>, span: Option<Span>) {
        if let Some(span) = span {
            elements.push(CommandTextElement::Literal {
                text: self.source.slice(span).to_string(),
                span,
            });
        }
    }

    fn push_arg_text(&self, elements: &mut Vec<DecoratorElement>, span: Option<Span>) {
        if let Some(span) = span {
            elements.push(DecoratorElement::Text {
                text: self.source.slice(span).to_string(),
                span,
            });
        }
    }

    // -- Token cursor --

    fn peek(&self) -> Token<'a> {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> Token<'a> {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        self.tokens[idx]
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn bump(&mut self) -> Token<'a> {
        let tok = self.peek();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        self.last = tok.span;
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        self.at(kind).then(|| self.bump())
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> PResult<Token<'a>> {
        if self.at(kind) {
            return Ok(self.bump());
        }
        let tok = self.peek();
        Err(self.error(
            ParseErrorKind::Expected {
                expected,
                found: tok.kind,
            },
            tok.span,
        ))
    }

    /// Any name, keywords included.
    fn expect_name(&mut self, expected: &'static str) -> PResult<Token<'a>> {
        if is_name_like(self.peek().kind) {
            return Ok(self.bump());
        }
        let tok = self.peek();
        Err(self.error(
            ParseErrorKind::Expected {
                expected,
                found: tok.kind,
            },
            tok.span,
        ))
    }

    /// A missing `;` is reported but does not abandon the definition.
    fn expect_semicolon(&mut self) {
        if self.eat(TokenKind::Semicolon).is_none() {
            let tok = self.peek();
            self.error(
                ParseErrorKind::Expected {
                    expected: "';'",
                    found: tok.kind,
                },
                tok.span,
            );
        }
    }

    fn at_statement_end(&self, ctx: Context) -> bool {
        match self.peek().kind {
            TokenKind::Semicolon | TokenKind::Newline | TokenKind::Eof => true,
            TokenKind::RBrace => ctx == Context::Block,
            _ => false,
        }
    }

    /// `@`, a name, and `(` with nothing between them.
    fn at_inline_decorator(&self) -> bool {
        let (at, name, open) = (self.nth(0), self.nth(1), self.nth(2));
        at.kind == TokenKind::At
            && is_name_like(name.kind)
            && open.kind == TokenKind::LParen
            && adjacent(at, name)
            && adjacent(name, open)
    }

    fn nested<T>(&mut self, span: Span, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(
                ParseErrorKind::NestingTooDeep {
                    limit: MAX_NESTING_DEPTH,
                },
                span,
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    const fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            last: self.last,
            diagnostics: self.diagnostics.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.last = checkpoint.last;
        self.diagnostics.truncate(checkpoint.diagnostics);
    }

    fn error(&mut self, kind: ParseErrorKind, span: Span) -> Failed {
        self.diagnostics.push(Diagnostic::parse(&kind, span));
        Failed
    }
}

/// Verbatim source text pending between structural elements.
///
/// Whitespace between tokens is kept by slicing the source. Leading
/// whitespace is dropped unless the run follows a structural element;
/// trailing whitespace is kept only when another element follows.
/// Every boundary is a token edge, so spans reuse the lexer's line
/// and column positions.
#[derive(Debug, Default)]
struct TextRun {
    /// End of the last structural element.
    cursor: Option<Span>,
    start: Option<Span>,
    end: Span,
}

impl TextRun {
    fn push(&mut self, span: Span) {
        if self.start.is_none() {
            let first = span.start_point();
            self.start = Some(self.cursor.unwrap_or(first));
        }
        self.end = span.end_point();
    }

    /// Pending text up to the element at `next`, gap included.
    fn take_before(&mut self, next: Span) -> Option<Span> {
        let start = self.start.take().or(self.cursor)?;
        let text = start.merge(next.start_point());
        (!text.is_empty()).then_some(text)
    }

    /// Pending text up to the last token, trailing gap dropped.
    fn finish(&mut self) -> Option<Span> {
        self.start.take().map(|start| start.merge(self.end))
    }

    const fn resume_after(&mut self, element: Span) {
        self.cursor = Some(element.end_point());
    }
}

const fn is_name_like(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Name | TokenKind::Def | TokenKind::Watch | TokenKind::Stop
    )
}

const fn adjacent(a: Token<'_>, b: Token<'_>) -> bool {
    a.span.end_offset == b.span.start_offset
}

/// Whether a block statement closes with the `}` of a block body.
fn ends_in_block(statement: &BlockStatement) -> bool {
    fn body_ends_in_block(decorated: &DecoratedBody) -> bool {
        match decorated.inner.as_deref() {
            Some(CommandBody::Block(_)) => true,
            Some(CommandBody::Decorated(inner)) => body_ends_in_block(inner),
            None | Some(CommandBody::Simple(_)) => false,
        }
    }
    match statement {
        BlockStatement::Plain(_) => false,
        BlockStatement::Decorated(decorated) => body_ends_in_block(decorated),
    }
}

/// Whether the innermost body of a decorated chain is command text,
/// which at top level must be closed by `;`.
fn ends_in_simple_command(decorated: &DecoratedBody) -> bool {
    match decorated.inner.as_deref() {
        None | Some(CommandBody::Block(_)) => false,
        Some(CommandBody::Simple(_)) => true,
        Some(CommandBody::Decorated(inner)) => ends_in_simple_command(inner),
    }
}
