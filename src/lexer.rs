use std::fmt;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::source::SourceFile;
use crate::token::{Span, Token, TokenKind};

const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// String opened with `quote` and never closed.
    UnterminatedString { quote: char },
    /// `\r` not followed by `\n`.
    StrayCarriageReturn,
    /// `\` as the final byte of the input.
    BackslashAtEof,
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString { quote } => {
                write!(f, "unterminated string, expected closing {quote}")
            }
            Self::StrayCarriageReturn => {
                write!(f, "carriage return without line feed")
            }
            Self::BackslashAtEof => {
                write!(f, "backslash at end of input")
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {}", ch.escape_debug())
            }
        }
    }
}

impl Diagnostic {
    /// Build a `LexError` diagnostic.
    #[must_use]
    pub fn lex(kind: &LexErrorKind, span: Span) -> Self {
        Self::new(DiagnosticCode::LexError, kind.to_string(), span)
    }
}

/// Tokenize a devcmd source file.
///
/// Never fails: rejected input becomes a hidden [`TokenKind::Error`]
/// token plus a `LexError` diagnostic. The returned stream always
/// ends with a zero-width [`TokenKind::Eof`], and the concatenation
/// of every token's text equals the source text.
#[must_use]
#[tracing::instrument(skip_all, fields(source = source.name(), source_len = source.len()))]
pub fn tokenize(source: &SourceFile) -> (Vec<Token<'_>>, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(source);
    lexer.run();
    tracing::debug!(
        tokens = lexer.tokens.len(),
        errors = lexer.diagnostics.len(),
        "lexed source"
    );
    (lexer.tokens, lexer.diagnostics)
}

struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    /// Only spaces and tabs seen since the last line break.
    line_is_blank: bool,
    tokens: Vec<Token<'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a SourceFile) -> Self {
        let input = source.text();
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            line_is_blank: true,
            tokens: Vec::with_capacity(input.len() / 2 + 1),
            diagnostics: Vec::new(),
        }
    }

    fn run(&mut self) {
        if self.bytes.starts_with(BOM) {
            self.emit(TokenKind::Whitespace, BOM.len());
        }

        while self.pos < self.bytes.len() {
            self.scan_token();
        }

        self.emit(TokenKind::Eof, self.pos);
    }

    fn scan_token(&mut self) {
        let ch = self.bytes[self.pos];

        match ch {
            b' ' | b'\t' => {
                let end = self.scan_while(self.pos, |b| b == b' ' || b == b'\t');
                self.emit(TokenKind::Whitespace, end);
            }
            b'\n' => {
                self.emit(TokenKind::Newline, self.pos + 1);
                self.line_is_blank = true;
            }
            b'\r' => {
                if self.peek_at(1) == Some(b'\n') {
                    self.emit(TokenKind::Newline, self.pos + 2);
                } else {
                    self.error(LexErrorKind::StrayCarriageReturn, self.pos + 1);
                }
                self.line_is_blank = true;
            }
            b'#' if self.line_is_blank => {
                let end = self.scan_while(self.pos, |b| b != b'\n' && b != b'\r');
                self.emit(TokenKind::Comment, end);
            }
            b'"' => self.read_string(b'"', TokenKind::String),
            b'\'' => self.read_string(b'\'', TokenKind::SingleString),
            b'\\' => self.read_backslash(),
            b'$' => self.read_dollar(),
            b'a'..=b'z' | b'A'..=b'Z' => self.read_name(),
            b'0'..=b'9' => self.read_number(),
            b'-' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => self.read_number(),
            b'.' | b'/' | b'~' if self.peek_at(1).is_some_and(is_path_byte) => {
                let end = self.scan_while(self.pos + 1, is_path_byte);
                self.emit(TokenKind::PathContent, end);
            }
            _ => {
                if let Some(kind) = punctuation(ch) {
                    self.emit(kind, self.pos + 1);
                } else {
                    let bad = self.input[self.pos..].chars().next().unwrap_or('\u{FFFD}');
                    self.error(
                        LexErrorKind::UnexpectedCharacter(bad),
                        self.pos + bad.len_utf8(),
                    );
                }
            }
        }
    }

    fn read_string(&mut self, quote: u8, kind: TokenKind) {
        let mut i = self.pos + 1;
        loop {
            match self.bytes.get(i) {
                None => {
                    self.error(
                        LexErrorKind::UnterminatedString {
                            quote: char::from(quote),
                        },
                        self.bytes.len(),
                    );
                    return;
                }
                // a backslash escapes whatever follows, including the quote
                Some(b'\\') => i += 2,
                Some(&b) if b == quote => break,
                Some(_) => i += 1,
            }
        }
        self.emit(kind, i + 1);
    }

    fn read_backslash(&mut self) {
        let kind = match self.peek_at(1) {
            None => {
                self.error(LexErrorKind::BackslashAtEof, self.pos + 1);
                return;
            }
            Some(b'\n' | b'\r') => {
                self.emit(TokenKind::Backslash, self.pos + 1);
                return;
            }
            Some(b'$') => TokenKind::EscapedDollar,
            Some(b';') => TokenKind::EscapedSemicolon,
            Some(b'{') => TokenKind::EscapedLBrace,
            Some(b'}') => TokenKind::EscapedRBrace,
            Some(_) => TokenKind::EscapedChar,
        };
        let escaped_len = self.input[self.pos + 1..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.emit(kind, self.pos + 1 + escaped_len);
    }

    fn read_dollar(&mut self) {
        match self.peek_at(1) {
            // $(NAME)
            Some(b'(') if self.peek_at(2).is_some_and(|b| b.is_ascii_alphabetic()) => {
                let name_end = self.scan_while(self.pos + 2, is_name_byte);
                if self.bytes.get(name_end) == Some(&b')') {
                    self.emit(TokenKind::VarRef, name_end + 1);
                    return;
                }
            }
            // ${NAME}
            Some(b'{') if self.peek_at(2).is_some_and(is_shell_name_start) => {
                let name_end = self.scan_while(self.pos + 2, is_shell_name_byte);
                if self.bytes.get(name_end) == Some(&b'}') {
                    self.emit(TokenKind::ShellVar, name_end + 1);
                    return;
                }
            }
            // $NAME
            Some(b) if is_shell_name_start(b) => {
                let end = self.scan_while(self.pos + 1, is_shell_name_byte);
                self.emit(TokenKind::ShellVar, end);
                return;
            }
            _ => {}
        }
        self.emit(TokenKind::Dollar, self.pos + 1);
    }

    fn read_name(&mut self) {
        let end = self.scan_while(self.pos, is_name_byte);
        let kind = match &self.input[self.pos..end] {
            "def" => TokenKind::Def,
            "watch" => TokenKind::Watch,
            "stop" => TokenKind::Stop,
            _ => TokenKind::Name,
        };
        self.emit(kind, end);
    }

    fn read_number(&mut self) {
        let digits_start = if self.bytes[self.pos] == b'-' {
            self.pos + 1
        } else {
            self.pos
        };
        let mut end = self.scan_while(digits_start, |b| b.is_ascii_digit());
        if self.bytes.get(end) == Some(&b'.')
            && self.bytes.get(end + 1).is_some_and(u8::is_ascii_digit)
        {
            end = self.scan_while(end + 1, |b| b.is_ascii_digit());
        }
        self.emit(TokenKind::Number, end);
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn scan_while(&self, from: usize, pred: impl Fn(u8) -> bool) -> usize {
        let mut i = from;
        while i < self.bytes.len() && pred(self.bytes[i]) {
            i += 1;
        }
        i
    }

    /// Push a token covering `self.pos..end` and advance past it.
    fn emit(&mut self, kind: TokenKind, end: usize) {
        let start = self.pos;
        let (start_line, start_col) = (self.line, self.col);
        self.advance_to(end);

        if !matches!(
            kind,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment | TokenKind::Eof
        ) {
            self.line_is_blank = false;
        }

        self.tokens.push(Token {
            kind,
            text: &self.input[start..end],
            span: Span {
                start_offset: start,
                end_offset: end,
                start_line,
                start_col,
                end_line: self.line,
                end_col: self.col,
            },
        });
    }

    fn error(&mut self, kind: LexErrorKind, end: usize) {
        self.emit(TokenKind::Error, end);
        if let Some(token) = self.tokens.last() {
            self.diagnostics.push(Diagnostic::lex(&kind, token.span));
        }
    }

    /// Move to `end`, keeping line/column in step with
    /// `SourceFile::location`.
    fn advance_to(&mut self, end: usize) {
        let (input, bytes, start) = (self.input, self.bytes, self.pos);
        for (i, c) in input[start..end].char_indices() {
            match c {
                '\n' => {
                    self.line += 1;
                    self.col = 1;
                }
                '\r' if bytes.get(start + i + 1) != Some(&b'\n') => {
                    self.line += 1;
                    self.col = 1;
                }
                _ => self.col += 1,
            }
        }
        self.pos = end;
    }
}

fn punctuation(ch: u8) -> Option<TokenKind> {
    let kind = match ch {
        b'@' => TokenKind::At,
        b'=' => TokenKind::Equals,
        b':' => TokenKind::Colon,
        b';' => TokenKind::Semicolon,
        b'{' => TokenKind::LBrace,
        b'}' => TokenKind::RBrace,
        b'(' => TokenKind::LParen,
        b')' => TokenKind::RParen,
        b'&' => TokenKind::Ampersand,
        b'|' => TokenKind::Pipe,
        b'<' => TokenKind::Lt,
        b'>' => TokenKind::Gt,
        b'.' => TokenKind::Dot,
        b',' => TokenKind::Comma,
        b'/' => TokenKind::Slash,
        b'-' => TokenKind::Dash,
        b'*' => TokenKind::Star,
        b'+' => TokenKind::Plus,
        b'?' => TokenKind::Question,
        b'!' => TokenKind::Exclaim,
        b'%' => TokenKind::Percent,
        b'^' => TokenKind::Caret,
        b'~' => TokenKind::Tilde,
        b'_' => TokenKind::Underscore,
        b'[' => TokenKind::LBracket,
        b']' => TokenKind::RBracket,
        b'#' => TokenKind::Hash,
        b'"' => TokenKind::DoubleQuote,
        b'`' => TokenKind::Backtick,
        _ => return None,
    };
    Some(kind)
}

const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

const fn is_shell_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

const fn is_shell_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

const fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'/' | b'~' | b'-' | b'_')
}
