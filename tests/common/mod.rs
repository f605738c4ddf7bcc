#![allow(dead_code)]

use devcmd_rs::{
    CommandBody, Diagnostic, DiagnosticCode, ParseOptions, ParseResult, Program, SimpleCommand,
    SourceFile, format, parse, parse_str,
};

/// Parse with default options, panicking on any diagnostic.
pub fn parse_clean(input: &str) -> Program {
    let result = parse_str(input);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for:\n{input}\n{:#?}",
        result.diagnostics
    );
    result.program
}

pub fn parse_with(input: &str, options: &ParseOptions) -> ParseResult {
    parse(&SourceFile::new("test.cli", input), options)
}

pub fn codes(diagnostics: &[Diagnostic]) -> Vec<DiagnosticCode> {
    diagnostics.iter().map(|d| d.code).collect()
}

/// The body of plain command `name`, which must be a simple command.
pub fn simple_body<'a>(program: &'a Program, name: &str) -> &'a SimpleCommand {
    match &program
        .command(name)
        .unwrap_or_else(|| panic!("no command `{name}`"))
        .body
    {
        CommandBody::Simple(simple) => simple,
        other => panic!("expected a simple body for `{name}`, got {other:?}"),
    }
}

/// Assert that formatting `input` reproduces it exactly.
pub fn roundtrip(input: &str) {
    let program = parse_clean(input);
    let output = format(&program);
    assert_eq!(
        output, input,
        "round-trip mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}

/// Format a program, parse it back, and assert the result formats
/// identically.
pub fn assert_ast_roundtrip(original: &Program) {
    let formatted = format(original);
    let result = parse_str(&formatted);
    assert!(
        !result.has_errors(),
        "failed to re-parse formatted output: {:#?}\n--- formatted ---\n{formatted}",
        result.diagnostics
    );
    let reformatted = format(&result.program);
    assert_eq!(
        formatted, reformatted,
        "format is not stable\n--- first ---\n{formatted}\n--- second ---\n{reformatted}"
    );
}
