//! Parse configuration.

use std::collections::HashSet;

/// Options accepted by [`parse`](crate::parse).
///
/// The default accepts every decorator name, reports warnings as
/// warnings, and places no limit on input size.
///
/// ```
/// use devcmd_rs::ParseOptions;
///
/// let options = ParseOptions::new()
///     .known_decorators(["retry", "timeout", "parallel"])
///     .strict(true)
///     .max_input_bytes(1 << 20);
/// assert!(options.accepts_decorator("retry"));
/// assert!(!options.accepts_decorator("sh"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Allow-list of decorator names; `None` accepts all.
    pub known_decorators: Option<HashSet<String>>,
    /// Promote warnings to errors.
    pub strict: bool,
    /// Skip parsing inputs longer than this many bytes.
    pub max_input_bytes: Option<usize>,
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report decorators whose name is not in `names`.
    #[must_use]
    pub fn known_decorators<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_decorators = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = Some(limit);
        self
    }

    /// Whether a decorator called `name` passes the allow-list.
    #[must_use]
    pub fn accepts_decorator(&self, name: &str) -> bool {
        self.known_decorators
            .as_ref()
            .is_none_or(|known| known.contains(name))
    }
}
