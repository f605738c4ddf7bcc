//! Fluent construction of program trees.
//!
//! Built nodes carry default spans. Adjacent literal pieces are merged
//! so that a built tree matches what the parser produces for the
//! formatted text.

use crate::ast::{
    BlockBody, BlockStatement, CommandBody, CommandDef, CommandText, CommandTextElement,
    DecoratedBody, Decorator, DecoratorContent, DecoratorElement, DecoratorForm, Modifier,
    Program, SimpleCommand, TopLevelItem, VariableDef,
};
use crate::token::Span;

impl Program {
    /// Create a new empty program.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a variable definition.
    #[must_use]
    pub fn with_variable(mut self, var: VariableDef) -> Self {
        self.items.push(TopLevelItem::Variable(var));
        self
    }

    /// Add a command definition.
    #[must_use]
    pub fn with_command(mut self, cmd: CommandDef) -> Self {
        self.items.push(TopLevelItem::Command(cmd));
        self
    }

    /// Add a blank line separating groups of definitions.
    #[must_use]
    pub fn with_blank_line(mut self) -> Self {
        self.items.push(TopLevelItem::BlankLine(Span::default()));
        self
    }
}

impl VariableDef {
    #[must_use]
    pub fn new(name: &str, value: impl Into<CommandText>) -> Self {
        Self {
            name: name.to_string(),
            name_span: Span::default(),
            value: value.into(),
            span: Span::default(),
            malformed: false,
        }
    }
}

impl CommandDef {
    /// A plain command.
    #[must_use]
    pub fn new(name: &str, body: CommandBody) -> Self {
        Self::with_modifier(Modifier::None, name, body)
    }

    /// The `watch` variant of `name`.
    #[must_use]
    pub fn watch(name: &str, body: CommandBody) -> Self {
        Self::with_modifier(Modifier::Watch, name, body)
    }

    /// The `stop` variant of `name`.
    #[must_use]
    pub fn stop(name: &str, body: CommandBody) -> Self {
        Self::with_modifier(Modifier::Stop, name, body)
    }

    fn with_modifier(modifier: Modifier, name: &str, body: CommandBody) -> Self {
        Self {
            modifier,
            name: name.to_string(),
            name_span: Span::default(),
            body,
            span: Span::default(),
            malformed: false,
        }
    }
}

impl CommandBody {
    /// A single command line.
    #[must_use]
    pub fn simple(text: impl Into<CommandText>) -> Self {
        Self::Simple(SimpleCommand::new(text))
    }

    #[must_use]
    pub const fn block(block: BlockBody) -> Self {
        Self::Block(block)
    }

    #[must_use]
    pub const fn decorated(decorated: DecoratedBody) -> Self {
        Self::Decorated(decorated)
    }
}

impl SimpleCommand {
    #[must_use]
    pub fn new(text: impl Into<CommandText>) -> Self {
        Self {
            text: text.into(),
            continuations: Vec::new(),
            span: Span::default(),
        }
    }

    /// Append a continuation line.
    #[must_use]
    pub fn continuation(mut self, text: impl Into<CommandText>) -> Self {
        self.continuations.push(text.into());
        self
    }
}

impl From<SimpleCommand> for CommandBody {
    fn from(simple: SimpleCommand) -> Self {
        Self::Simple(simple)
    }
}

impl BlockBody {
    /// Create an empty block.
    #[must_use]
    pub fn new() -> Self {
        Self {
            statements: Vec::new(),
            span: Span::default(),
        }
    }

    /// Add a plain command statement.
    #[must_use]
    pub fn plain(self, command: impl Into<CommandText>) -> Self {
        self.statement(BlockStatement::Plain(SimpleCommand::new(command)))
    }

    /// Add a decorated statement.
    #[must_use]
    pub fn decorated(self, decorated: DecoratedBody) -> Self {
        self.statement(BlockStatement::Decorated(decorated))
    }

    #[must_use]
    pub fn statement(mut self, statement: BlockStatement) -> Self {
        self.statements.push(statement);
        self
    }
}

impl Default for BlockBody {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoratedBody {
    /// Apply `decorator` with no inner body (function form).
    #[must_use]
    pub fn new(decorator: Decorator) -> Self {
        Self {
            decorator,
            inner: None,
            span: Span::default(),
        }
    }

    /// Set the body the decorator wraps.
    #[must_use]
    pub fn body(mut self, inner: CommandBody) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }
}

impl Decorator {
    /// `@name(args)`
    #[must_use]
    pub fn function(name: &str) -> Self {
        Self::with_form(name, DecoratorForm::Function)
    }

    /// `@name(args) { ... }`
    #[must_use]
    pub fn block(name: &str) -> Self {
        Self::with_form(name, DecoratorForm::Block)
    }

    /// `@name(args): command`
    #[must_use]
    pub fn simple(name: &str) -> Self {
        Self::with_form(name, DecoratorForm::Simple)
    }

    fn with_form(name: &str, form: DecoratorForm) -> Self {
        Self {
            name: name.to_string(),
            form,
            args: DecoratorContent::default(),
            span: Span::default(),
        }
    }

    /// Append argument text verbatim.
    #[must_use]
    pub fn arg(mut self, text: &str) -> Self {
        self.args = self.args.text(text);
        self
    }

    /// Append a nested decorator call to the arguments.
    #[must_use]
    pub fn nested(mut self, decorator: Self) -> Self {
        self.args.elements.push(DecoratorElement::Nested(decorator));
        self
    }

    /// Append a parenthesised group to the arguments.
    #[must_use]
    pub fn group(mut self, content: DecoratorContent) -> Self {
        self.args.elements.push(DecoratorElement::Group {
            content,
            span: Span::default(),
        });
        self
    }
}

impl DecoratorContent {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Append text, merging with a preceding text run.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        if text.is_empty() {
            return self;
        }
        if let Some(DecoratorElement::Text { text: last, .. }) = self.elements.last_mut() {
            last.push_str(text);
        } else {
            self.elements.push(DecoratorElement::Text {
                text: text.to_string(),
                span: Span::default(),
            });
        }
        self
    }
}

impl CommandText {
    /// Create empty command text.
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            span: Span::default(),
        }
    }

    /// Command text consisting of a single literal.
    #[must_use]
    pub fn literal(text: &str) -> Self {
        Self::new().text(text)
    }

    /// Append literal text, merging with a preceding literal.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        if text.is_empty() {
            return self;
        }
        if let Some(CommandTextElement::Literal { text: last, .. }) = self.elements.last_mut() {
            last.push_str(text);
        } else {
            self.elements.push(CommandTextElement::Literal {
                text: text.to_string(),
                span: Span::default(),
            });
        }
        self
    }

    /// Append a `$(NAME)` reference.
    #[must_use]
    pub fn var(self, name: &str) -> Self {
        self.element(CommandTextElement::VarRef {
            name: name.to_string(),
            span: Span::default(),
        })
    }

    /// Append a `$NAME` shell reference.
    #[must_use]
    pub fn shell_var(self, name: &str) -> Self {
        self.element(CommandTextElement::ShellVarRef {
            name: name.to_string(),
            span: Span::default(),
        })
    }

    /// Append an escaped character, written back as `\c`.
    #[must_use]
    pub fn escaped(self, ch: char) -> Self {
        self.element(CommandTextElement::EscapedChar {
            ch,
            span: Span::default(),
        })
    }

    /// Append an inline `@name(args)` call.
    #[must_use]
    pub fn decorator(self, decorator: Decorator) -> Self {
        self.element(CommandTextElement::InlineDecorator(decorator))
    }

    fn element(mut self, element: CommandTextElement) -> Self {
        self.elements.push(element);
        self
    }
}

impl From<&str> for CommandText {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}
