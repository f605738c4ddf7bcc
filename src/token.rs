use std::fmt;
use std::ops::Range;

/// Source location: a half-open byte range with line/column annotations.
///
/// Lines and columns are 1-based; columns count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start_offset: usize,
    pub end_offset: usize,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Span {
    /// Length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let (start_offset, start_line, start_col) = if other.start_offset < self.start_offset {
            (other.start_offset, other.start_line, other.start_col)
        } else {
            (self.start_offset, self.start_line, self.start_col)
        };
        let (end_offset, end_line, end_col) = if other.end_offset > self.end_offset {
            (other.end_offset, other.end_line, other.end_col)
        } else {
            (self.end_offset, self.end_line, self.end_col)
        };
        Self {
            start_offset,
            end_offset,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Zero-width span at the start of `self`.
    #[must_use]
    pub const fn start_point(self) -> Self {
        Self {
            start_offset: self.start_offset,
            end_offset: self.start_offset,
            start_line: self.start_line,
            start_col: self.start_col,
            end_line: self.start_line,
            end_col: self.start_col,
        }
    }

    /// Zero-width span at the end of `self`.
    #[must_use]
    pub const fn end_point(self) -> Self {
        Self {
            start_offset: self.end_offset,
            end_offset: self.end_offset,
            start_line: self.end_line,
            start_col: self.end_col,
            end_line: self.end_line,
            end_col: self.end_col,
        }
    }

    /// Byte range for indexing into the source text.
    #[must_use]
    pub const fn as_range(&self) -> Range<usize> {
        self.start_offset..self.end_offset
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Keyword `def`.
    Def,
    /// Keyword `watch`.
    Watch,
    /// Keyword `stop`.
    Stop,
    At,
    Equals,
    Colon,
    Semicolon,
    LBrace,
    RBrace,
    LParen,
    RParen,
    /// A bare `\` immediately followed by a line break.
    Backslash,
    /// Double-quoted string, quotes included in the lexeme.
    String,
    /// Single-quoted string, quotes included in the lexeme.
    SingleString,
    /// Identifier: letter, then letters, digits, `_` or `-`.
    Name,
    /// Optional `-`, digits, optional fractional part.
    Number,
    /// A run of path-safe characters starting with `.`, `/` or `~`.
    PathContent,
    Ampersand,
    Pipe,
    Lt,
    Gt,
    Dot,
    Comma,
    Slash,
    Dash,
    Star,
    Plus,
    Question,
    Exclaim,
    Percent,
    Caret,
    Tilde,
    Underscore,
    LBracket,
    RBracket,
    Dollar,
    Hash,
    /// A lone `"`. Never produced for well-formed strings; an
    /// unterminated string is reported as [`TokenKind::Error`].
    DoubleQuote,
    Backtick,
    /// `$(NAME)`: reference to a devcmd variable.
    VarRef,
    /// `$NAME` or `${NAME}`: reference to a shell variable.
    ShellVar,
    /// `\$`
    EscapedDollar,
    /// `\;`
    EscapedSemicolon,
    /// `\{`
    EscapedLBrace,
    /// `\}`
    EscapedRBrace,
    /// `\` followed by any other character.
    EscapedChar,
    /// Line comment; only when `#` is the first non-blank on its line.
    Comment,
    /// `\n` or `\r\n`.
    Newline,
    /// Spaces, tabs, or a leading byte order mark.
    Whitespace,
    /// Bytes the lexer rejected. A diagnostic is always emitted
    /// alongside.
    Error,
    /// Zero-width end of input.
    Eof,
}

/// Which consumer a token is intended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Seen by the parser.
    Default,
    /// Emitted for lossless token streams but skipped by the parser.
    Hidden,
}

impl TokenKind {
    #[must_use]
    pub const fn channel(self) -> Channel {
        match self {
            Self::Whitespace | Self::Comment | Self::Error => Channel::Hidden,
            _ => Channel::Default,
        }
    }

    /// Short human-readable description used in diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Def => "'def'",
            Self::Watch => "'watch'",
            Self::Stop => "'stop'",
            Self::At => "'@'",
            Self::Equals => "'='",
            Self::Colon => "':'",
            Self::Semicolon => "';'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::Backslash => "line continuation",
            Self::String | Self::SingleString => "string",
            Self::Name => "name",
            Self::Number => "number",
            Self::PathContent => "path",
            Self::Ampersand => "'&'",
            Self::Pipe => "'|'",
            Self::Lt => "'<'",
            Self::Gt => "'>'",
            Self::Dot => "'.'",
            Self::Comma => "','",
            Self::Slash => "'/'",
            Self::Dash => "'-'",
            Self::Star => "'*'",
            Self::Plus => "'+'",
            Self::Question => "'?'",
            Self::Exclaim => "'!'",
            Self::Percent => "'%'",
            Self::Caret => "'^'",
            Self::Tilde => "'~'",
            Self::Underscore => "'_'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::Dollar => "'$'",
            Self::Hash => "'#'",
            Self::DoubleQuote => "'\"'",
            Self::Backtick => "'`'",
            Self::VarRef => "variable reference",
            Self::ShellVar => "shell variable",
            Self::EscapedDollar
            | Self::EscapedSemicolon
            | Self::EscapedLBrace
            | Self::EscapedRBrace
            | Self::EscapedChar => "escape sequence",
            Self::Comment => "comment",
            Self::Newline => "newline",
            Self::Whitespace => "whitespace",
            Self::Error => "invalid input",
            Self::Eof => "end of input",
        }
    }

    /// Whether this is one of the `ESCAPED_*` kinds.
    #[must_use]
    pub const fn is_escape(self) -> bool {
        matches!(
            self,
            Self::EscapedDollar
                | Self::EscapedSemicolon
                | Self::EscapedLBrace
                | Self::EscapedRBrace
                | Self::EscapedChar
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A single token: its kind, the exact source text it covers,
/// and its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub span: Span,
}

impl<'src> Token<'src> {
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.kind.channel()
    }

    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        matches!(self.channel(), Channel::Hidden)
    }

    /// The variable name carried by a `VarRef` or `ShellVar` token.
    #[must_use]
    pub fn var_name(&self) -> Option<&'src str> {
        match self.kind {
            TokenKind::VarRef => self
                .text
                .strip_prefix("$(")
                .and_then(|s| s.strip_suffix(')')),
            TokenKind::ShellVar => {
                let inner = self.text.strip_prefix('$')?;
                Some(
                    inner
                        .strip_prefix('{')
                        .and_then(|s| s.strip_suffix('}'))
                        .unwrap_or(inner),
                )
            }
            _ => None,
        }
    }

    /// The character an `ESCAPED_*` token stands for.
    #[must_use]
    pub fn escaped_char(&self) -> Option<char> {
        if !self.kind.is_escape() {
            return None;
        }
        self.text.strip_prefix('\\')?.chars().next()
    }
}
