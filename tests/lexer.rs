//! Lexer edge cases and error tests.

use devcmd_rs::{Channel, DiagnosticCode, SourceFile, Token, TokenKind, tokenize};

fn kinds(input: &str) -> Vec<TokenKind> {
    let source = SourceFile::new("test.cli", input);
    let (tokens, _) = tokenize(&source);
    tokens
        .iter()
        .filter(|t| t.channel() == Channel::Default)
        .map(|t| t.kind)
        .collect()
}

fn with_tokens<R>(input: &str, f: impl FnOnce(&[Token<'_>]) -> R) -> R {
    let source = SourceFile::new("test.cli", input);
    let (tokens, _) = tokenize(&source);
    f(&tokens)
}

// -----------------------------------------------------------
// Basic lexer behaviour.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    let source = SourceFile::new("empty", "");
    let (tokens, diagnostics) = tokenize(&source);
    assert!(diagnostics.is_empty());
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
    assert_eq!(tokens[0].span.start_offset, 0);
}

#[test]
fn lex_only_whitespace() {
    assert_eq!(
        kinds("   \t  \n\n  "),
        [TokenKind::Newline, TokenKind::Newline, TokenKind::Eof]
    );
}

#[test]
fn lex_multiple_comments() {
    with_tokens("# comment 1\n\t# comment 2\n", |tokens| {
        let comments: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Comment)
            .map(|t| t.text)
            .collect();
        assert_eq!(comments, ["# comment 1", "# comment 2"]);
        assert!(tokens.iter().filter(|t| t.kind == TokenKind::Comment).all(Token::is_hidden));
    });
}

#[test]
fn lex_hash_after_code_is_punctuation() {
    assert_eq!(
        kinds("x: a # b;"),
        [
            TokenKind::Name,
            TokenKind::Colon,
            TokenKind::Name,
            TokenKind::Hash,
            TokenKind::Name,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lex_crlf_line_endings() {
    with_tokens("a: b;\r\nc: d;\r\n", |tokens| {
        let newlines: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Newline)
            .map(|t| t.text)
            .collect();
        assert_eq!(newlines, ["\r\n", "\r\n"]);
        let c = tokens.iter().find(|t| t.text == "c").unwrap();
        assert_eq!((c.span.start_line, c.span.start_col), (2, 1));
    });
}

#[test]
fn lex_decorator_tokens() {
    assert_eq!(
        kinds("@retry(3) {"),
        [
            TokenKind::At,
            TokenKind::Name,
            TokenKind::LParen,
            TokenKind::Number,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lex_shell_punctuation() {
    assert_eq!(
        kinds("a && b | c > d < e ! f % g ^ h * i + j ? k , l [ m ] n `o`"),
        [
            TokenKind::Name,
            TokenKind::Ampersand,
            TokenKind::Ampersand,
            TokenKind::Name,
            TokenKind::Pipe,
            TokenKind::Name,
            TokenKind::Gt,
            TokenKind::Name,
            TokenKind::Lt,
            TokenKind::Name,
            TokenKind::Exclaim,
            TokenKind::Name,
            TokenKind::Percent,
            TokenKind::Name,
            TokenKind::Caret,
            TokenKind::Name,
            TokenKind::Star,
            TokenKind::Name,
            TokenKind::Plus,
            TokenKind::Name,
            TokenKind::Question,
            TokenKind::Name,
            TokenKind::Comma,
            TokenKind::Name,
            TokenKind::LBracket,
            TokenKind::Name,
            TokenKind::RBracket,
            TokenKind::Name,
            TokenKind::Backtick,
            TokenKind::Name,
            TokenKind::Backtick,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lex_underscore_and_tilde_alone() {
    assert_eq!(
        kinds("_ ~"),
        [TokenKind::Underscore, TokenKind::Tilde, TokenKind::Eof]
    );
}

#[test]
fn lex_dash_flags() {
    assert_eq!(
        kinds("-v --all -3"),
        [
            TokenKind::Dash,
            TokenKind::Name,
            TokenKind::Dash,
            TokenKind::Dash,
            TokenKind::Name,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

// -----------------------------------------------------------
// Strings, escapes, and references.
// -----------------------------------------------------------

#[test]
fn lex_string_spanning_lines() {
    with_tokens("x: \"one\ntwo\";\ny", |tokens| {
        let string = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(string.text, "\"one\ntwo\"");
        assert_eq!((string.span.end_line, string.span.end_col), (2, 5));
        let y = tokens.iter().find(|t| t.text == "y").unwrap();
        assert_eq!(y.span.start_line, 3);
    });
}

#[test]
fn lex_string_keeps_semicolons_and_braces() {
    assert_eq!(
        kinds("echo \"a; {b}\";"),
        [
            TokenKind::Name,
            TokenKind::String,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lex_var_ref_names() {
    with_tokens("$(BUILD_DIR) $(out-dir) ${HOME} $PATH", |tokens| {
        let names: Vec<_> = tokens.iter().filter_map(Token::var_name).collect();
        assert_eq!(names, ["BUILD_DIR", "out-dir", "HOME", "PATH"]);
    });
}

#[test]
fn lex_unclosed_var_ref_falls_back() {
    assert_eq!(
        kinds("$(PORT"),
        [
            TokenKind::Dollar,
            TokenKind::LParen,
            TokenKind::Name,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lex_escaped_characters() {
    with_tokens(r"\$ \a \\", |tokens| {
        let chars: Vec<_> = tokens.iter().filter_map(Token::escaped_char).collect();
        assert_eq!(chars, ['$', 'a', '\\']);
    });
}

#[test]
fn lex_escaped_multibyte_character() {
    with_tokens("\\é!", |tokens| {
        assert_eq!(tokens[0].kind, TokenKind::EscapedChar);
        assert_eq!(tokens[0].text, "\\é");
        assert_eq!(tokens[1].kind, TokenKind::Exclaim);
    });
}

#[test]
fn lex_continuation_before_crlf() {
    assert_eq!(
        kinds("a \\\r\nb"),
        [
            TokenKind::Name,
            TokenKind::Backslash,
            TokenKind::Newline,
            TokenKind::Name,
            TokenKind::Eof,
        ]
    );
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn lex_error_unterminated_single_quote() {
    let source = SourceFile::new("t", "echo 'oops\nnext: x;\n");
    let (tokens, diagnostics) = tokenize(&source);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::LexError);
    assert!(diagnostics[0].message.contains('\''));
    let error = tokens.iter().find(|t| t.kind == TokenKind::Error).unwrap();
    assert_eq!(error.text, "'oops\nnext: x;\n");
}

#[test]
fn lex_error_spans_point_at_offender() {
    let source = SourceFile::new("t", "ab\n  €");
    let (_, diagnostics) = tokenize(&source);
    assert_eq!(diagnostics.len(), 1);
    let span = diagnostics[0].span;
    assert_eq!((span.start_line, span.start_col), (2, 3));
    assert_eq!(span.len(), '€'.len_utf8());
}

#[test]
fn lex_errors_are_hidden_tokens() {
    let source = SourceFile::new("t", "a € b");
    let (tokens, diagnostics) = tokenize(&source);
    assert_eq!(diagnostics.len(), 1);
    let error = tokens.iter().find(|t| t.kind == TokenKind::Error).unwrap();
    assert!(error.is_hidden());
    assert_eq!(kinds("a € b"), [TokenKind::Name, TokenKind::Name, TokenKind::Eof]);
}

#[test]
fn lex_lone_carriage_return_advances_line() {
    let source = SourceFile::new("t", "a\rb");
    let (tokens, diagnostics) = tokenize(&source);
    assert_eq!(diagnostics.len(), 1);
    let b = tokens.iter().find(|t| t.text == "b").unwrap();
    assert_eq!((b.span.start_line, b.span.start_col), (2, 1));
}

#[test]
fn lex_backslash_at_eof() {
    let source = SourceFile::new("t", "build: make \\");
    let (tokens, diagnostics) = tokenize(&source);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::LexError);
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
}
