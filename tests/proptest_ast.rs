//! Property-based tests with proptest.
//!
//! Token-level properties run on arbitrary text. Tree-level properties
//! generate random programs with the builder API, format them, parse
//! them back, and verify the output is stable.
//!
//! We check `format(parse(format(p))) == format(p)` rather than
//! `p == parse(format(p))` because spans differ and the parser may
//! regroup some constructs (e.g. a body that is a lone `@name(args)`
//! comes back as a function-form decorator, not command text).

mod common;

use common::simple_body;
use devcmd_rs::{
    BlockBody, BlockStatement, CommandBody, CommandDef, CommandText, DecoratedBody, Decorator,
    Program, SimpleCommand, SourceFile, Span, TokenKind, VariableDef, format, parse_str, tokenize,
};
use proptest::prelude::*;

// -- Leaf strategies --

/// Shell word: no whitespace, quotes, or characters with meaning to
/// the parser.
fn word() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9._/-]{0,8}".prop_map(|s| s)
}

fn var_name() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,6}".prop_map(|s| s)
}

fn decorator_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}".prop_map(|s| s)
}

/// Optional decorator argument text.
fn decorator_arg() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        1 => Just(None),
        2 => "[a-z0-9]{1,5}".prop_map(Some),
    ]
}

#[derive(Debug, Clone)]
enum Atom {
    Word(String),
    Var(String),
    Shell(String),
    Escaped(char),
    Call(String, String),
}

fn atom() -> impl Strategy<Value = Atom> {
    prop_oneof![
        6 => word().prop_map(Atom::Word),
        2 => var_name().prop_map(Atom::Var),
        1 => "[A-Z_][A-Z0-9_]{0,5}".prop_map(Atom::Shell),
        1 => prop::sample::select(vec!['$', ';', '{', '}', '\\', 'n']).prop_map(Atom::Escaped),
        1 => (decorator_name(), "[a-z0-9]{1,5}").prop_map(|(n, a)| Atom::Call(n, a)),
    ]
}

/// Command text with no leading or trailing whitespace. Each atom is
/// either glued to the previous one or separated by a single space.
fn command_text() -> impl Strategy<Value = CommandText> {
    prop::collection::vec((atom(), any::<bool>()), 1..=5).prop_map(|atoms| {
        let mut text = CommandText::new();
        for (i, (atom, glued)) in atoms.into_iter().enumerate() {
            if i > 0 && !glued {
                text = text.text(" ");
            }
            text = match atom {
                Atom::Word(w) => text.text(&w),
                Atom::Var(name) => text.var(&name),
                Atom::Shell(name) => text.shell_var(&name),
                Atom::Escaped(ch) => text.escaped(ch),
                Atom::Call(name, arg) => text.decorator(Decorator::function(&name).arg(&arg)),
            };
        }
        text
    })
}

fn simple_command() -> impl Strategy<Value = SimpleCommand> {
    (command_text(), prop::collection::vec(command_text(), 0..=2)).prop_map(|(text, rest)| {
        rest.into_iter()
            .fold(SimpleCommand::new(text), SimpleCommand::continuation)
    })
}

fn with_arg(decorator: Decorator, arg: Option<String>) -> Decorator {
    match arg {
        Some(arg) => decorator.arg(&arg),
        None => decorator,
    }
}

/// Decorated body at a given depth (limits recursion)
fn decorated(depth: u32) -> BoxedStrategy<DecoratedBody> {
    let function = (decorator_name(), "[a-z0-9 ]{0,8}").prop_map(|(name, arg)| {
        DecoratedBody::new(Decorator::function(&name).arg(arg.trim()))
    });
    let simple = (decorator_name(), decorator_arg(), simple_command()).prop_map(
        |(name, arg, inner)| {
            DecoratedBody::new(with_arg(Decorator::simple(&name), arg)).body(inner.into())
        },
    );

    if depth == 0 {
        prop_oneof![function, simple].boxed()
    } else {
        let block = (decorator_name(), decorator_arg(), block(depth - 1)).prop_map(
            |(name, arg, block)| {
                DecoratedBody::new(with_arg(Decorator::block(&name), arg))
                    .body(CommandBody::block(block))
            },
        );
        prop_oneof![
            1 => function,
            1 => simple,
            2 => block,
        ]
        .boxed()
    }
}

fn block(depth: u32) -> BoxedStrategy<BlockBody> {
    let statement = prop_oneof![
        3 => simple_command().prop_map(BlockStatement::Plain),
        1 => decorated(depth).prop_map(BlockStatement::Decorated),
    ];
    prop::collection::vec(statement, 0..=3)
        .prop_map(|statements| statements.into_iter().fold(BlockBody::new(), BlockBody::statement))
        .boxed()
}

fn command_body() -> impl Strategy<Value = CommandBody> {
    prop_oneof![
        3 => simple_command().prop_map(CommandBody::from),
        1 => block(2).prop_map(CommandBody::block),
        1 => decorated(2).prop_map(CommandBody::decorated),
    ]
}

/// Name, body, and optional `watch` and `stop` bodies.
type CommandGroup = (String, CommandBody, Option<CommandText>, Option<CommandText>);

fn command_group() -> impl Strategy<Value = CommandGroup> {
    (
        "[a-z][a-z0-9]{0,6}",
        command_body(),
        prop::option::weighted(0.2, command_text()),
        prop::option::weighted(0.2, command_text()),
    )
}

/// Full program. Index suffixes keep every name unique, and variable
/// names are upper case so they never clash with commands.
fn program() -> impl Strategy<Value = Program> {
    (
        prop::collection::vec((var_name(), prop::option::of(command_text())), 0..=3),
        prop::collection::vec((command_group(), any::<bool>()), 0..=5),
    )
        .prop_map(|(vars, commands)| {
            let mut program = Program::new();
            for (i, (name, value)) in vars.into_iter().enumerate() {
                let value = value.unwrap_or_default();
                program = program.with_variable(VariableDef::new(&format!("{name}_{i}"), value));
            }
            for (i, ((name, body, watch, stop), blank)) in commands.into_iter().enumerate() {
                let name = format!("{name}-{i}");
                if blank {
                    program = program.with_blank_line();
                }
                program = program.with_command(CommandDef::new(&name, body));
                if let Some(text) = watch {
                    program = program.with_command(CommandDef::watch(&name, CommandBody::simple(text)));
                }
                if let Some(text) = stop {
                    program = program.with_command(CommandDef::stop(&name, CommandBody::simple(text)));
                }
            }
            program
        })
}

/// Plain text between `:` and `;`: words and quoted strings separated
/// by runs of blanks.
fn plain_command_source() -> impl Strategy<Value = (String, String, String)> {
    let piece = prop_oneof![
        4 => word(),
        1 => "\"[a-z ;{}]{0,8}\"".prop_map(|s| s),
        1 => "'[a-z ;]{0,8}'".prop_map(|s| s),
    ];
    (
        "[ \t]{0,2}",
        prop::collection::vec((piece, "[ \t]{1,3}"), 1..=5),
        "[ \t]{0,2}",
    )
        .prop_map(|(lead, pieces, trail)| {
            let mut body = String::new();
            for (i, (piece, gap)) in pieces.iter().enumerate() {
                if i > 0 {
                    body.push_str(gap);
                }
                body.push_str(piece);
            }
            (lead, body, trail)
        })
}

fn assert_ordered(spans: &[Span]) -> Result<(), TestCaseError> {
    for pair in spans.windows(2) {
        prop_assert!(
            pair[0].end_offset <= pair[1].start_offset,
            "overlapping siblings: {:?} then {:?}",
            pair[0],
            pair[1]
        );
    }
    Ok(())
}

fn check_body_spans(body: &CommandBody) -> Result<(), TestCaseError> {
    match body {
        CommandBody::Simple(_) => Ok(()),
        CommandBody::Block(block) => check_block_spans(block),
        CommandBody::Decorated(decorated) => match decorated.inner.as_deref() {
            Some(inner) => check_body_spans(inner),
            None => Ok(()),
        },
    }
}

fn check_block_spans(block: &BlockBody) -> Result<(), TestCaseError> {
    let spans: Vec<_> = block.statements.iter().map(BlockStatement::span).collect();
    assert_ordered(&spans)?;
    for statement in &block.statements {
        if let BlockStatement::Decorated(decorated) = statement {
            if let Some(inner) = decorated.inner.as_deref() {
                check_body_spans(inner)?;
            }
        }
    }
    Ok(())
}

// -- Property tests --

proptest! {
    /// Token lexemes, hidden ones included, reassemble the input.
    #[test]
    fn lexemes_reassemble_source(input in any::<String>()) {
        let source = SourceFile::new("p", input.as_str());
        let (tokens, _) = tokenize(&source);
        let joined: String = tokens.iter().map(|t| t.text).collect();
        prop_assert_eq!(joined, input);
    }

    /// Tokens never overlap and the stream ends with a zero-width EOF.
    #[test]
    fn token_spans_are_monotonic(input in "[a-z0-9@(){}:;=$\\\\ \t\r\n#\"'./-]{0,120}") {
        let source = SourceFile::new("p", input.as_str());
        let (tokens, _) = tokenize(&source);
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].span.end_offset <= pair[1].span.start_offset);
        }
        let eof = tokens.last().unwrap();
        prop_assert_eq!(eof.kind, TokenKind::Eof);
        prop_assert_eq!(eof.span.start_offset, input.len());
        prop_assert!(eof.span.is_empty());
    }

    /// `parse` returns a result for any input.
    #[test]
    fn parse_never_panics(input in "[a-z@(){}:;=$\\\\ \t\r\n#\"'.-]{0,200}") {
        let result = parse_str(&input);
        let top: Vec<_> = result.program.items.iter().map(|item| item.span()).collect();
        assert_ordered(&top)?;
    }

    /// Braces, continuations and stray carriage returns inside a block
    /// always let the parser finish.
    #[test]
    fn parse_never_stalls_in_blocks(
        pieces in prop::collection::vec(
            prop::sample::select(vec!["{", "}", "\\\r", "\\", "\r", "@a", "@a(x)", ":", " ", "x", ";", "\n"]),
            0..40,
        )
    ) {
        let input = std::format!("b: {{ {} }}\n", pieces.concat());
        let _ = parse_str(&input);
    }

    /// Arbitrary Unicode input never panics either.
    #[test]
    fn parse_never_panics_on_unicode(input in any::<String>()) {
        let _ = parse_str(&input);
    }

    /// Plain command text is the trimmed source between `:` and `;`.
    #[test]
    fn command_text_matches_source((lead, body, trail) in plain_command_source()) {
        let input = std::format!("cmd:{lead}{body}{trail};\n");
        let result = parse_str(&input);
        prop_assert!(result.diagnostics.is_empty(), "{:#?}", result.diagnostics);
        let literal = simple_body(&result.program, "cmd").text.to_literal();
        prop_assert_eq!(literal.as_deref(), Some(body.as_str()));
    }

    /// Formatting is idempotent: format(parse(format(p))) == format(p).
    /// This is the core round-trip property.
    #[test]
    fn format_idempotent(program in program()) {
        let r1 = format(&program);
        let result = parse_str(&r1);
        prop_assert!(
            !result.has_errors(),
            "parse errors: {:#?}\n--- output ---\n{}",
            result.diagnostics,
            r1
        );
        let r2 = format(&result.program);
        prop_assert_eq!(r1, r2);
    }

    /// Definition counts survive the round-trip.
    #[test]
    fn definition_counts_preserved(program in program()) {
        let parsed = parse_str(&format(&program)).program;
        prop_assert_eq!(program.variables().count(), parsed.variables().count());
        prop_assert_eq!(program.commands().count(), parsed.commands().count());
    }

    /// Sibling nodes in a parsed program never overlap.
    #[test]
    fn sibling_spans_are_ordered(program in program()) {
        let parsed = parse_str(&format(&program)).program;
        let top: Vec<_> = parsed.items.iter().map(|item| item.span()).collect();
        assert_ordered(&top)?;
        for command in parsed.commands() {
            check_body_spans(&command.body)?;
        }
    }
}
