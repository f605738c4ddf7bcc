//! Typed program tree produced by the parser.
//!
//! Nodes own copies of the text they retain, so a [`Program`] stays
//! usable after the [`SourceFile`](crate::SourceFile) is dropped. Spans
//! still refer to offsets in that file.

use std::fmt;

use crate::formatter;
use crate::token::Span;

/// Complete devcmd document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub items: Vec<TopLevelItem>,
}

/// One line-level item of a program, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopLevelItem {
    Variable(VariableDef),
    Command(CommandDef),
    /// An empty or comment-only line.
    BlankLine(Span),
}

/// `def NAME = text;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDef {
    pub name: String,
    pub name_span: Span,
    /// Empty when the right-hand side is empty.
    pub value: CommandText,
    pub span: Span,
    /// The parser recovered from an error inside this definition.
    pub malformed: bool,
}

/// Optional prefix of a command definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modifier {
    #[default]
    None,
    Watch,
    Stop,
}

/// `[watch|stop] NAME: body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDef {
    pub modifier: Modifier,
    pub name: String,
    pub name_span: Span,
    pub body: CommandBody,
    pub span: Span,
    /// The parser recovered from an error inside this definition.
    pub malformed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandBody {
    Simple(SimpleCommand),
    Block(BlockBody),
    Decorated(DecoratedBody),
}

/// One command line plus its backslash continuations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleCommand {
    pub text: CommandText,
    pub continuations: Vec<CommandText>,
    pub span: Span,
}

/// `{ stmt; stmt; ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBody {
    pub statements: Vec<BlockStatement>,
    pub span: Span,
}

/// A decorator applied to an optional inner body.
///
/// `inner` is `None` for the function form, a block body for the
/// block form, and a simple command for the simple form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedBody {
    pub decorator: Decorator,
    pub inner: Option<Box<CommandBody>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStatement {
    Decorated(DecoratedBody),
    Plain(SimpleCommand),
}

/// `@name(args)`, `@name(args) { ... }`, `@name: { ... }` or `@name: text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    pub name: String,
    pub form: DecoratorForm,
    pub args: DecoratorContent,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorForm {
    /// Parenthesised arguments, nothing following.
    Function,
    /// Followed by a block body.
    Block,
    /// `@name:` followed by command text on the same line.
    Simple,
}

/// Raw decorator arguments, kept structured but uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecoratorContent {
    pub elements: Vec<DecoratorElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoratorElement {
    /// Source text between structural elements, whitespace included.
    Text { text: String, span: Span },
    Nested(Decorator),
    /// `( ... )` inside the arguments.
    Group { content: DecoratorContent, span: Span },
    Newline(Span),
}

/// A run of command text up to `;`, a line break, or a continuation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandText {
    pub elements: Vec<CommandTextElement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTextElement {
    /// Shell text copied verbatim, quotes included.
    Literal { text: String, span: Span },
    InlineDecorator(Decorator),
    /// `$(NAME)`
    VarRef { name: String, span: Span },
    /// `$NAME` or `${NAME}`
    ShellVarRef { name: String, span: Span },
    /// `\c`; contributes `c` to the command string.
    EscapedChar { ch: char, span: Span },
}

impl Program {
    /// Variable and command definitions, skipping blank lines.
    pub fn definitions(&self) -> impl Iterator<Item = &TopLevelItem> {
        self.items
            .iter()
            .filter(|item| !matches!(item, TopLevelItem::BlankLine(_)))
    }

    /// True when the program defines nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions().next().is_none()
    }

    /// Variable definitions in source order, duplicates included.
    pub fn variables(&self) -> impl Iterator<Item = &VariableDef> {
        self.items.iter().filter_map(|item| match item {
            TopLevelItem::Variable(v) => Some(v),
            _ => None,
        })
    }

    /// The definition of `name` in effect: the last one wins.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&VariableDef> {
        self.variables().filter(|v| v.name == name).last()
    }

    /// Command definitions in source order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandDef> {
        self.items.iter().filter_map(|item| match item {
            TopLevelItem::Command(c) => Some(c),
            _ => None,
        })
    }

    /// Command definitions with the given modifier, in source order.
    pub fn commands_with(&self, modifier: Modifier) -> impl Iterator<Item = &CommandDef> {
        self.commands().filter(move |c| c.modifier == modifier)
    }

    /// The plain (unmodified) command called `name`.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&CommandDef> {
        self.command_with(Modifier::None, name)
    }

    #[must_use]
    pub fn command_with(&self, modifier: Modifier, name: &str) -> Option<&CommandDef> {
        self.commands_with(modifier).find(|c| c.name == name)
    }

    /// The `watch` and `stop` definitions linked to `name`.
    #[must_use]
    pub fn lifecycle(&self, name: &str) -> Lifecycle<'_> {
        Lifecycle {
            watch: self.command_with(Modifier::Watch, name),
            stop: self.command_with(Modifier::Stop, name),
        }
    }

    /// Every decorator in the tree, outer before inner, in source order.
    #[must_use]
    pub fn decorators(&self) -> Vec<&Decorator> {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                TopLevelItem::Variable(v) => collect_text(&v.value, &mut out),
                TopLevelItem::Command(c) => collect_body(&c.body, &mut out),
                TopLevelItem::BlankLine(_) => {}
            }
        }
        out
    }
}

/// Lifecycle variants attached to a command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle<'a> {
    pub watch: Option<&'a CommandDef>,
    pub stop: Option<&'a CommandDef>,
}

impl TopLevelItem {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Variable(v) => v.span,
            Self::Command(c) => c.span,
            Self::BlankLine(span) => *span,
        }
    }
}

impl CommandBody {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Simple(s) => s.span,
            Self::Block(b) => b.span,
            Self::Decorated(d) => d.span,
        }
    }
}

impl BlockStatement {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Decorated(d) => d.span,
            Self::Plain(s) => s.span,
        }
    }
}

impl DecoratorElement {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Text { span, .. } | Self::Group { span, .. } | Self::Newline(span) => *span,
            Self::Nested(d) => d.span,
        }
    }
}

impl CommandTextElement {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Literal { span, .. }
            | Self::VarRef { span, .. }
            | Self::ShellVarRef { span, .. }
            | Self::EscapedChar { span, .. } => *span,
            Self::InlineDecorator(d) => d.span,
        }
    }

    /// The literal text, if this is a `Literal`.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl CommandText {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Concatenation of literal and escaped pieces only; `None` if
    /// the text contains references or inline decorators.
    #[must_use]
    pub fn to_literal(&self) -> Option<String> {
        let mut out = String::new();
        for element in &self.elements {
            match element {
                CommandTextElement::Literal { text, .. } => out.push_str(text),
                CommandTextElement::EscapedChar { ch, .. } => out.push(*ch),
                _ => return None,
            }
        }
        Some(out)
    }

    /// The shell-visible command string before variable substitution.
    ///
    /// Escapes are resolved; references and inline decorators are
    /// rendered back in their source syntax.
    #[must_use]
    pub fn to_shell_string(&self) -> String {
        let mut out = String::new();
        for element in &self.elements {
            match element {
                CommandTextElement::Literal { text, .. } => out.push_str(text),
                CommandTextElement::EscapedChar { ch, .. } => out.push(*ch),
                CommandTextElement::VarRef { name, .. } => {
                    out.push_str("$(");
                    out.push_str(name);
                    out.push(')');
                }
                CommandTextElement::ShellVarRef { name, .. } => {
                    out.push('$');
                    out.push_str(name);
                }
                CommandTextElement::InlineDecorator(d) => formatter::write_decorator_call(&mut out, d),
            }
        }
        out
    }

    /// Names of `$(NAME)` references, in order.
    pub fn var_refs(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            CommandTextElement::VarRef { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

impl SimpleCommand {
    /// The command string with continuation lines joined.
    ///
    /// Whitespace at each joint is collapsed to a single space.
    #[must_use]
    pub fn effective_text(&self) -> String {
        let mut out = self.text.to_shell_string();
        for continuation in &self.continuations {
            let piece = continuation.to_shell_string();
            let piece = piece.trim_start();
            let trimmed_len = out.trim_end().len();
            out.truncate(trimmed_len);
            if !out.is_empty() && !piece.is_empty() {
                out.push(' ');
            }
            out.push_str(piece);
        }
        out
    }
}

impl DecoratorContent {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Arguments rendered back as source text, without the outer parentheses.
    #[must_use]
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        formatter::write_decorator_content(&mut out, self);
        out
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Watch => write!(f, "watch"),
            Self::Stop => write!(f, "stop"),
        }
    }
}

fn collect_body<'a>(body: &'a CommandBody, out: &mut Vec<&'a Decorator>) {
    match body {
        CommandBody::Simple(s) => collect_simple(s, out),
        CommandBody::Block(b) => collect_block(b, out),
        CommandBody::Decorated(d) => collect_decorated(d, out),
    }
}

fn collect_block<'a>(block: &'a BlockBody, out: &mut Vec<&'a Decorator>) {
    for statement in &block.statements {
        match statement {
            BlockStatement::Decorated(d) => collect_decorated(d, out),
            BlockStatement::Plain(s) => collect_simple(s, out),
        }
    }
}

fn collect_decorated<'a>(decorated: &'a DecoratedBody, out: &mut Vec<&'a Decorator>) {
    collect_decorator(&decorated.decorator, out);
    if let Some(inner) = &decorated.inner {
        collect_body(inner, out);
    }
}

fn collect_simple<'a>(simple: &'a SimpleCommand, out: &mut Vec<&'a Decorator>) {
    collect_text(&simple.text, out);
    for continuation in &simple.continuations {
        collect_text(continuation, out);
    }
}

fn collect_text<'a>(text: &'a CommandText, out: &mut Vec<&'a Decorator>) {
    for element in &text.elements {
        if let CommandTextElement::InlineDecorator(d) = element {
            collect_decorator(d, out);
        }
    }
}

fn collect_decorator<'a>(decorator: &'a Decorator, out: &mut Vec<&'a Decorator>) {
    out.push(decorator);
    collect_content(&decorator.args, out);
}

fn collect_content<'a>(content: &'a DecoratorContent, out: &mut Vec<&'a Decorator>) {
    for element in &content.elements {
        match element {
            DecoratorElement::Nested(d) => collect_decorator(d, out),
            DecoratorElement::Group { content, .. } => collect_content(content, out),
            DecoratorElement::Text { .. } | DecoratorElement::Newline(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> CommandTextElement {
        CommandTextElement::Literal {
            text: text.to_string(),
            span: Span::default(),
        }
    }

    fn text(elements: Vec<CommandTextElement>) -> CommandText {
        CommandText {
            elements,
            span: Span::default(),
        }
    }

    #[test]
    fn shell_string_resolves_escapes_and_keeps_refs() {
        let t = text(vec![
            literal("echo "),
            CommandTextElement::EscapedChar {
                ch: '$',
                span: Span::default(),
            },
            literal("x "),
            CommandTextElement::VarRef {
                name: "PORT".to_string(),
                span: Span::default(),
            },
            literal(" "),
            CommandTextElement::ShellVarRef {
                name: "HOME".to_string(),
                span: Span::default(),
            },
        ]);
        assert_eq!(t.to_shell_string(), "echo $x $(PORT) $HOME");
        assert_eq!(t.to_literal(), None);
        assert_eq!(t.var_refs().collect::<Vec<_>>(), ["PORT"]);
    }

    #[test]
    fn effective_text_collapses_joints() {
        let cmd = SimpleCommand {
            text: text(vec![literal("echo one ")]),
            continuations: vec![text(vec![literal("two ")]), text(vec![literal("three")])],
            span: Span::default(),
        };
        assert_eq!(cmd.effective_text(), "echo one two three");
    }

    #[test]
    fn effective_text_skips_empty_continuation() {
        let cmd = SimpleCommand {
            text: text(vec![literal("ls")]),
            continuations: vec![text(Vec::new())],
            span: Span::default(),
        };
        assert_eq!(cmd.effective_text(), "ls");
    }

    #[test]
    fn modifier_display() {
        assert_eq!(Modifier::Watch.to_string(), "watch");
        assert_eq!(Modifier::Stop.to_string(), "stop");
        assert_eq!(Modifier::None.to_string(), "");
    }
}
