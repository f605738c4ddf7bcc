//! Structured errors and warnings.
//!
//! Diagnostics are data: the lexer, parser, and semantic checker
//! append them to an ordered list and keep going. Rendering is
//! left to the caller.

use std::fmt;

use crate::token::Span;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Stable, machine-readable diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// Illegal character, unterminated string, stray carriage return.
    LexError,
    /// Token did not match any alternative.
    ParseError,
    DuplicateVariable,
    DuplicateCommand,
    /// Decorator name missing from the configured allow-list.
    UnknownDecorator,
    /// `watch`/`stop` definition without a plain command.
    OrphanLifecycle,
    /// Input exceeded `ParseOptions::max_input_bytes`.
    InputTooLarge,
}

impl DiagnosticCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LexError => "lex-error",
            Self::ParseError => "parse-error",
            Self::DuplicateVariable => "duplicate-variable",
            Self::DuplicateCommand => "duplicate-command",
            Self::UnknownDecorator => "unknown-decorator",
            Self::OrphanLifecycle => "orphan-lifecycle",
            Self::InputTooLarge => "input-too-large",
        }
    }

    /// Severity a diagnostic with this code carries before
    /// strict mode is applied.
    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::OrphanLifecycle => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary location attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub span: Span,
    pub message: String,
}

/// A single error or warning with its location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{severity}[{code}]: {message} at line {}, column {}", span.start_line, span.start_col)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Span,
    pub notes: Vec<Note>,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity.
    #[must_use]
    pub fn new(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            span,
            notes: Vec::new(),
        }
    }

    /// Attach a secondary location.
    #[must_use]
    pub fn with_note(mut self, span: Span, message: impl Into<String>) -> Self {
        self.notes.push(Note {
            span,
            message: message.into(),
        });
        self
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}
