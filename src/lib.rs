//! devcmd lexer, parser, semantic checker, formatter, and builder.
//!
//! A typed AST for devcmd command definition files with tools to
//! parse them from text, check them, build them programmatically,
//! and format them back to canonical syntax.
//!
//! Parsing is total: every call returns a [`Program`] together with
//! an ordered list of [`Diagnostic`]s. Errors never abort the parse.
//!
//! # Quick start
//!
//! ## Parse a devcmd file
//!
//! ```
//! use devcmd_rs::{ParseOptions, SourceFile, parse};
//!
//! let source = SourceFile::new("commands.cli", "def PORT = 8080;\nserver: echo on $(PORT);\n");
//! let result = parse(&source, &ParseOptions::default());
//! assert!(!result.has_errors());
//!
//! let server = result.program.command("server").unwrap();
//! assert_eq!(server.name, "server");
//! ```
//!
//! ## Build and format a program
//!
//! ```
//! use devcmd_rs::{CommandBody, CommandDef, CommandText, Program, VariableDef, format};
//!
//! let program = Program::new()
//!     .with_variable(VariableDef::new("PORT", "8080"))
//!     .with_command(CommandDef::new(
//!         "server",
//!         CommandBody::simple(CommandText::literal("serve --port ").var("PORT")),
//!     ));
//!
//! assert_eq!(format(&program), "def PORT = 8080;\nserver: serve --port $(PORT);\n");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builder;
pub mod diagnostics;
pub mod formatter;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod semantic;
pub mod source;
pub mod token;

pub use ast::{
    BlockBody, BlockStatement, CommandBody, CommandDef, CommandText, CommandTextElement,
    DecoratedBody, Decorator, DecoratorContent, DecoratorElement, DecoratorForm, Lifecycle,
    Modifier, Program, SimpleCommand, TopLevelItem, VariableDef,
};
pub use diagnostics::{Diagnostic, DiagnosticCode, Note, Severity};
pub use formatter::format;
pub use lexer::{LexErrorKind, tokenize};
pub use options::ParseOptions;
pub use parser::{ParseErrorKind, parse_tokens};
pub use source::{SourceError, SourceFile};
pub use token::{Channel, Span, Token, TokenKind};

/// Outcome of [`parse`]: the program and every diagnostic, in
/// emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Whether any diagnostic has error severity. Such a program
    /// should be treated as invalid.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    /// The program if no error was reported, otherwise all diagnostics.
    pub fn into_result(self) -> Result<Program, Vec<Diagnostic>> {
        if self.has_errors() {
            Err(self.diagnostics)
        } else {
            Ok(self.program)
        }
    }
}

/// Lex, parse, and check `source`.
///
/// Runs to completion on every input. With `options.strict` set,
/// warnings are reported as errors once all checks have run.
#[must_use]
#[tracing::instrument(skip_all, fields(source = source.name(), len = source.len()))]
pub fn parse(source: &SourceFile, options: &ParseOptions) -> ParseResult {
    if let Some(limit) = options.max_input_bytes.filter(|&limit| source.len() > limit) {
        tracing::warn!(limit, "input exceeds size limit, skipping parse");
        let diagnostic = Diagnostic::new(
            DiagnosticCode::InputTooLarge,
            format!("input is {} bytes, limit is {limit}", source.len()),
            source.span(0, 0),
        );
        return ParseResult {
            program: Program::default(),
            diagnostics: vec![diagnostic],
        };
    }

    let (tokens, mut diagnostics) = tokenize(source);
    let (program, parse_diagnostics) = parse_tokens(source, &tokens);
    diagnostics.extend(parse_diagnostics);
    diagnostics.extend(semantic::check(&program, options));

    if options.strict {
        for diagnostic in &mut diagnostics {
            diagnostic.severity = Severity::Error;
        }
    }

    ParseResult {
        program,
        diagnostics,
    }
}

/// Parse a string with default options, labelled `<input>`.
#[must_use]
pub fn parse_str(input: &str) -> ParseResult {
    parse(&SourceFile::new("<input>", input), &ParseOptions::default())
}
