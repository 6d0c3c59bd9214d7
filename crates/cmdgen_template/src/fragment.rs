//! Fragment Trees
//!
//! A [`Fragment`] is a pure tree describing a piece of generated text. It is
//! built from already-resolved descriptor data and evaluated once by
//! [`TemplateEngine::render`](crate::TemplateEngine::render).
//!
//! ```rust,ignore
//! let body = Fragment::seq([
//!     Fragment::line("struct Foo"),
//!     Fragment::line("{"),
//!     Fragment::indented(1, Fragment::when(has_padding, Fragment::line("uint8_t __pad0[4];"))),
//!     Fragment::line("};"),
//! ]);
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::error::ProducerError;

/// Signature of a producer callback.
pub type ProduceFn<'a> = dyn Fn() -> Result<String, ProducerError> + 'a;

/// A named producer callback.
///
/// The name identifies the producer in diagnostics and in cycle detection;
/// two producers sharing a name are treated as the same producer.
pub struct Producer<'a> {
    name: Cow<'a, str>,
    func: Box<ProduceFn<'a>>,
}

impl<'a> Producer<'a> {
    pub fn new<F>(name: impl Into<Cow<'a, str>>, func: F) -> Self
    where
        F: Fn() -> Result<String, ProducerError> + 'a,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn call(&self) -> Result<String, ProducerError> {
        (self.func)()
    }
}

impl fmt::Debug for Producer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A node in a template tree.
pub enum Fragment<'a> {
    /// Text emitted verbatim. Literals are never scanned for markup.
    ///
    /// `TemplateEngine::render` still normalizes whitespace across the whole
    /// output, so trailing spaces and extra blank lines in a literal are
    /// dropped there. `TemplateEngine::render_raw` keeps them.
    Literal(Cow<'a, str>),

    /// Text computed by a producer. The produced text may contain
    /// `{{ name }}` markup, which is expanded through the engine's registry.
    Placeholder(Producer<'a>),

    /// Generation-time inclusion. The predicate is evaluated once per render;
    /// when it is false the body is skipped entirely.
    Conditional {
        predicate: Box<dyn Fn() -> bool + 'a>,
        body: Box<Fragment<'a>>,
    },

    /// Ordered concatenation.
    Sequence(Vec<Fragment<'a>>),

    /// Indents every non-empty line of the rendered body by `depth` levels.
    Indented { depth: usize, body: Box<Fragment<'a>> },
}

impl<'a> Fragment<'a> {
    #[must_use]
    pub fn empty() -> Self {
        Self::Sequence(Vec::new())
    }

    pub fn literal(text: impl Into<Cow<'a, str>>) -> Self {
        Self::Literal(text.into())
    }

    /// A literal terminated by a newline.
    pub fn line(text: impl Into<Cow<'a, str>>) -> Self {
        let text: Cow<'a, str> = text.into();
        let mut text = text.into_owned();
        text.push('\n');
        Self::Literal(Cow::Owned(text))
    }

    pub fn placeholder<F>(name: impl Into<Cow<'a, str>>, func: F) -> Self
    where
        F: Fn() -> Result<String, ProducerError> + 'a,
    {
        Self::Placeholder(Producer::new(name, func))
    }

    /// Placeholder that renders a fixed value through `Display`.
    pub fn value<T>(name: impl Into<Cow<'a, str>>, value: T) -> Self
    where
        T: fmt::Display + 'a,
    {
        Self::placeholder(name, move || Ok(value.to_string()))
    }

    /// Placeholder whose output is a fixed markup string, expanded on render.
    pub fn markup(name: impl Into<Cow<'a, str>>, text: impl Into<Cow<'a, str>>) -> Self {
        let text: Cow<'a, str> = text.into();
        Self::placeholder(name, move || Ok(text.to_string()))
    }

    /// Includes `body` only when `condition` holds.
    #[must_use]
    pub fn when(condition: bool, body: Fragment<'a>) -> Self {
        Self::when_with(move || condition, body)
    }

    pub fn when_with<P>(predicate: P, body: Fragment<'a>) -> Self
    where
        P: Fn() -> bool + 'a,
    {
        Self::Conditional {
            predicate: Box::new(predicate),
            body: Box::new(body),
        }
    }

    pub fn seq(items: impl IntoIterator<Item = Fragment<'a>>) -> Self {
        Self::Sequence(items.into_iter().collect())
    }

    #[must_use]
    pub fn indented(depth: usize, body: Fragment<'a>) -> Self {
        Self::Indented {
            depth,
            body: Box::new(body),
        }
    }
}

impl<'a> From<&'a str> for Fragment<'a> {
    fn from(text: &'a str) -> Self {
        Self::Literal(Cow::Borrowed(text))
    }
}

impl From<String> for Fragment<'_> {
    fn from(text: String) -> Self {
        Self::Literal(Cow::Owned(text))
    }
}

impl fmt::Debug for Fragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Self::Placeholder(producer) => f.debug_tuple("Placeholder").field(producer).finish(),
            Self::Conditional { body, .. } => f
                .debug_struct("Conditional")
                .field("body", body)
                .finish_non_exhaustive(),
            Self::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Self::Indented { depth, body } => f
                .debug_struct("Indented")
                .field("depth", depth)
                .field("body", body)
                .finish(),
        }
    }
}
