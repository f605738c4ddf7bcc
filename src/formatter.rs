//! Pretty-printer that serializes a devcmd [`Program`] back into canonical text.
//!
//! One definition per line, block statements one per line indented by
//! tabs, continuation lines indented one tab deeper than their command.
//! Comments are not part of the tree and are not reproduced; runs of
//! blank lines collapse to one.

use crate::ast::{
    BlockBody, BlockStatement, CommandBody, CommandDef, CommandText, CommandTextElement,
    DecoratedBody, Decorator, DecoratorContent, DecoratorElement, DecoratorForm, Modifier,
    Program, SimpleCommand, TopLevelItem, VariableDef,
};

/// Format a `Program` into devcmd source text.
///
/// Parsing the output yields the same program up to spans, and
/// formatting is idempotent.
#[must_use]
pub fn format(program: &Program) -> String {
    let mut out = String::new();
    let mut pending_blank = false;

    for item in &program.items {
        match item {
            TopLevelItem::BlankLine(_) => pending_blank = !out.is_empty(),
            TopLevelItem::Variable(var) => {
                flush_blank(&mut out, &mut pending_blank);
                format_variable(&mut out, var);
            }
            TopLevelItem::Command(cmd) => {
                flush_blank(&mut out, &mut pending_blank);
                format_command(&mut out, cmd);
            }
        }
    }

    out
}

fn flush_blank(out: &mut String, pending: &mut bool) {
    if std::mem::take(pending) {
        out.push('\n');
    }
}

fn format_variable(out: &mut String, var: &VariableDef) {
    out.push_str("def ");
    out.push_str(&var.name);
    out.push_str(" = ");
    write_command_text(out, &var.value);
    out.push_str(";\n");
}

fn format_command(out: &mut String, cmd: &CommandDef) {
    if cmd.modifier != Modifier::None {
        out.push_str(&cmd.modifier.to_string());
        out.push(' ');
    }
    out.push_str(&cmd.name);
    out.push_str(": ");

    match &cmd.body {
        CommandBody::Simple(simple) => {
            format_simple(out, simple, 0);
            out.push(';');
        }
        CommandBody::Block(block) => format_block(out, block, 0),
        CommandBody::Decorated(decorated) => {
            if format_decorated(out, decorated, 0) {
                out.push(';');
            }
        }
    }
    out.push('\n');
}

fn format_simple(out: &mut String, simple: &SimpleCommand, indent: usize) {
    write_command_text(out, &simple.text);
    for continuation in &simple.continuations {
        out.push_str("\\\n");
        push_indent(out, indent + 1);
        write_command_text(out, continuation);
    }
}

fn format_block(out: &mut String, block: &BlockBody, indent: usize) {
    if block.statements.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push_str("{\n");
    for statement in &block.statements {
        push_indent(out, indent + 1);
        let needs_semicolon = match statement {
            BlockStatement::Plain(simple) => {
                format_simple(out, simple, indent + 1);
                true
            }
            BlockStatement::Decorated(decorated) => format_decorated(out, decorated, indent + 1),
        };
        if needs_semicolon {
            out.push(';');
        }
        out.push('\n');
    }
    push_indent(out, indent);
    out.push('}');
}

/// Write a decorated body. Returns whether a `;` should follow it,
/// which is false when it ends with a block.
fn format_decorated(out: &mut String, decorated: &DecoratedBody, indent: usize) -> bool {
    let decorator = &decorated.decorator;
    match (decorator.form, decorated.inner.as_deref()) {
        (_, None) | (DecoratorForm::Function, _) => {
            write_decorator_call(out, decorator);
            true
        }
        (_, Some(CommandBody::Block(block))) => {
            write_decorator_head(out, decorator);
            out.push(' ');
            format_block(out, block, indent);
            false
        }
        (_, Some(CommandBody::Simple(simple))) => {
            write_decorator_head(out, decorator);
            out.push_str(": ");
            format_simple(out, simple, indent);
            true
        }
        (_, Some(CommandBody::Decorated(inner))) => {
            write_decorator_head(out, decorator);
            out.push_str(": ");
            format_decorated(out, inner, indent)
        }
    }
}

/// `@name` for argument-less heads, `@name(args)` otherwise.
fn write_decorator_head(out: &mut String, decorator: &Decorator) {
    if decorator.args.is_empty() {
        out.push('@');
        out.push_str(&decorator.name);
    } else {
        write_decorator_call(out, decorator);
    }
}

/// Write `@name(args)`.
pub(crate) fn write_decorator_call(out: &mut String, decorator: &Decorator) {
    out.push('@');
    out.push_str(&decorator.name);
    out.push('(');
    write_decorator_content(out, &decorator.args);
    out.push(')');
}

/// Write decorator arguments without the surrounding parentheses.
pub(crate) fn write_decorator_content(out: &mut String, content: &DecoratorContent) {
    for element in &content.elements {
        match element {
            DecoratorElement::Text { text, .. } => out.push_str(text),
            DecoratorElement::Nested(decorator) => write_decorator_call(out, decorator),
            DecoratorElement::Group { content, .. } => {
                out.push('(');
                write_decorator_content(out, content);
                out.push(')');
            }
            DecoratorElement::Newline(_) => out.push('\n'),
        }
    }
}

fn write_command_text(out: &mut String, text: &CommandText) {
    let mut elements = text.elements.iter().peekable();
    while let Some(element) = elements.next() {
        match element {
            CommandTextElement::Literal { text, .. } => out.push_str(text),
            CommandTextElement::InlineDecorator(decorator) => write_decorator_call(out, decorator),
            CommandTextElement::VarRef { name, .. } => {
                out.push_str("$(");
                out.push_str(name);
                out.push(')');
            }
            CommandTextElement::ShellVarRef { name, .. } => {
                // `$A` followed by `b` would lex as `$Ab`
                let glued = elements
                    .peek()
                    .and_then(|next| next.as_literal())
                    .and_then(|text| text.bytes().next())
                    .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_');
                if glued {
                    out.push_str("${");
                    out.push_str(name);
                    out.push('}');
                } else {
                    out.push('$');
                    out.push_str(name);
                }
            }
            CommandTextElement::EscapedChar { ch, .. } => {
                out.push('\\');
                out.push(*ch);
            }
        }
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push('\t');
    }
}
