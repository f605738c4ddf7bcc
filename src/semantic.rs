//! Checks that run over a complete [`Program`].
//!
//! None of these passes alter the tree; they only report.

use std::collections::HashMap;

use crate::ast::{CommandDef, Modifier, Program, VariableDef};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::options::ParseOptions;

/// Run every semantic pass over `program`, returning diagnostics in
/// pass order: variables, commands, decorators, lifecycles.
#[must_use]
#[tracing::instrument(skip_all, fields(items = program.items.len()))]
pub fn check(program: &Program, options: &ParseOptions) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    check_variables(program, &mut diagnostics);
    check_commands(program, &mut diagnostics);
    check_decorators(program, options, &mut diagnostics);
    check_lifecycles(program, &mut diagnostics);
    tracing::debug!(count = diagnostics.len(), "semantic checks finished");
    diagnostics
}

fn check_variables(program: &Program, out: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<&str, &VariableDef> = HashMap::new();
    for var in program.variables() {
        if let Some(first) = seen.get(var.name.as_str()) {
            out.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateVariable,
                    format!("variable `{}` is defined more than once", var.name),
                    var.span,
                )
                .with_note(first.span, "first definition")
                .with_note(var.span, "redefinition; this value takes effect"),
            );
        } else {
            seen.insert(&var.name, var);
        }
    }
}

fn check_commands(program: &Program, out: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<(Modifier, &str), &CommandDef> = HashMap::new();
    for cmd in program.commands() {
        let key = (cmd.modifier, cmd.name.as_str());
        if let Some(first) = seen.get(&key) {
            out.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateCommand,
                    format!("{} is defined more than once", describe(cmd)),
                    cmd.span,
                )
                .with_note(first.span, "first definition"),
            );
            continue;
        }
        seen.insert(key, cmd);

        if cmd.modifier != Modifier::None {
            continue;
        }
        if let Some(var) = program.variables().find(|v| v.name == cmd.name) {
            out.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateCommand,
                    format!("command `{}` has the same name as a variable", cmd.name),
                    cmd.span,
                )
                .with_note(var.span, "variable defined here"),
            );
        }
    }
}

fn check_decorators(program: &Program, options: &ParseOptions, out: &mut Vec<Diagnostic>) {
    if options.known_decorators.is_none() {
        return;
    }
    for decorator in program.decorators() {
        if !options.accepts_decorator(&decorator.name) {
            out.push(Diagnostic::new(
                DiagnosticCode::UnknownDecorator,
                format!("unknown decorator `@{}`", decorator.name),
                decorator.span,
            ));
        }
    }
}

fn check_lifecycles(program: &Program, out: &mut Vec<Diagnostic>) {
    let lifecycle = program
        .commands()
        .filter(|c| c.modifier != Modifier::None);
    for cmd in lifecycle {
        if program.command(&cmd.name).is_none() {
            out.push(Diagnostic::new(
                DiagnosticCode::OrphanLifecycle,
                format!("{} has no matching command `{}`", describe(cmd), cmd.name),
                cmd.span,
            ));
        }
    }
}

fn describe(cmd: &CommandDef) -> String {
    match cmd.modifier {
        Modifier::None => format!("command `{}`", cmd.name),
        modifier => format!("`{modifier} {}`", cmd.name),
    }
}
