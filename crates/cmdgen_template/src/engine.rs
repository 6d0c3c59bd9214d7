//! Template Engine
//!
//! Renders [`Fragment`] trees into text. Producer output may reference other
//! producers through `{{ name }}` markup; those names are resolved against the
//! producers registered on the engine and expanded recursively.
//!
//! Re-entrant expansion is bounded: the engine tracks the active producer
//! chain, rejects any producer that re-enters itself, and stops at a fixed
//! nesting depth.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

use crate::error::{ProducerError, Result, TemplateError};
use crate::fragment::{Fragment, Producer};
use crate::whitespace;

/// Default producer nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 32;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Renders fragment trees with a registry of named producers.
pub struct TemplateEngine<'a> {
    producers: FxHashMap<Cow<'a, str>, Producer<'a>>,
    max_depth: usize,
}

impl Default for TemplateEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TemplateEngine<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            producers: FxHashMap::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Registers a named producer that markup can reference.
    ///
    /// Registering the same name twice replaces the earlier producer.
    #[must_use]
    pub fn with_producer<F>(mut self, name: impl Into<Cow<'a, str>>, func: F) -> Self
    where
        F: Fn() -> std::result::Result<String, ProducerError> + 'a,
    {
        self.register(name, func);
        self
    }

    /// Registers a producer that always yields `value`.
    #[must_use]
    pub fn with_value(self, name: impl Into<Cow<'a, str>>, value: impl ToString) -> Self {
        let value = value.to_string();
        self.with_producer(name, move || Ok(value.clone()))
    }

    pub fn register<F>(&mut self, name: impl Into<Cow<'a, str>>, func: F)
    where
        F: Fn() -> std::result::Result<String, ProducerError> + 'a,
    {
        let name: Cow<'a, str> = name.into();
        if self.producers.contains_key(&name) {
            log::trace!("Replacing template producer '{name}'");
        }
        let producer = Producer::new(name.clone(), func);
        self.producers.insert(name, producer);
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.producers.contains_key(name)
    }

    /// Renders a fragment tree and normalizes the resulting whitespace.
    ///
    /// Normalization applies to the whole output, literals included: trailing
    /// whitespace is trimmed from every line, runs of blank lines collapse to
    /// one and the text ends with a single newline. Use [`render_raw`] when
    /// literal text must come out byte-for-byte.
    ///
    /// [`render_raw`]: Self::render_raw
    pub fn render(&self, fragment: &Fragment<'_>) -> Result<String> {
        self.render_raw(fragment)
            .map(|out| whitespace::normalize(&out))
    }

    /// Renders a fragment tree without touching whitespace.
    pub fn render_raw(&self, fragment: &Fragment<'_>) -> Result<String> {
        let mut out = String::new();
        let mut chain = Vec::new();
        self.render_into(fragment, &mut chain, &mut out)?;
        Ok(out)
    }

    /// Expands `{{ name }}` markup in `text` without normalizing whitespace.
    pub fn expand(&self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut chain = Vec::new();
        self.expand_into(text, &mut chain, &mut out)?;
        Ok(out)
    }

    fn render_into(
        &self,
        fragment: &Fragment<'_>,
        chain: &mut Vec<String>,
        out: &mut String,
    ) -> Result<()> {
        match fragment {
            Fragment::Literal(text) => out.push_str(text),
            Fragment::Placeholder(producer) => self.invoke(producer, chain, out)?,
            Fragment::Conditional { predicate, body } => {
                if predicate() {
                    self.render_into(body, chain, out)?;
                }
            }
            Fragment::Sequence(items) => {
                for item in items {
                    self.render_into(item, chain, out)?;
                }
            }
            Fragment::Indented { depth, body } => {
                let mut inner = String::new();
                self.render_into(body, chain, &mut inner)?;
                out.push_str(&whitespace::indent(&inner, *depth));
            }
        }
        Ok(())
    }

    fn invoke(
        &self,
        producer: &Producer<'_>,
        chain: &mut Vec<String>,
        out: &mut String,
    ) -> Result<()> {
        let name = producer.name();

        if chain.iter().any(|active| active == name) {
            return Err(TemplateError::ProducerCycle {
                chain: format_chain(chain, Some(name)),
            });
        }
        if chain.len() >= self.max_depth {
            return Err(TemplateError::DepthExceeded {
                limit: self.max_depth,
                chain: format_chain(chain, Some(name)),
            });
        }

        chain.push(name.to_string());
        let text = producer.call().map_err(|source| TemplateError::Producer {
            name: name.to_string(),
            chain: format_chain(chain, None),
            source,
        })?;
        self.expand_into(&text, chain, out)?;
        chain.pop();
        Ok(())
    }

    fn expand_into(&self, text: &str, chain: &mut Vec<String>, out: &mut String) -> Result<()> {
        let mut rest = text;
        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let after = &rest[start + OPEN.len()..];
            let Some(end) = after.find(CLOSE) else {
                return Err(TemplateError::MalformedMarkup {
                    chain: format_chain(chain, None),
                    detail: format!("unterminated placeholder at byte {start}"),
                });
            };

            let key = after[..end].trim();
            if !is_identifier(key) {
                return Err(TemplateError::MalformedMarkup {
                    chain: format_chain(chain, None),
                    detail: format!("'{key}' is not a producer name"),
                });
            }

            let Some(producer) = self.producers.get(key) else {
                return Err(TemplateError::UnknownProducer {
                    name: key.to_string(),
                    chain: format_chain(chain, None),
                });
            };
            self.invoke(producer, chain, out)?;

            rest = &after[end + CLOSE.len()..];
        }
        out.push_str(rest);
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn format_chain(chain: &[String], next: Option<&str>) -> String {
    let mut parts: Vec<&str> = chain.iter().map(String::as_str).collect();
    parts.extend(next);
    if parts.is_empty() {
        "<root>".to_string()
    } else {
        parts.join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_literal_is_not_expanded() {
        let engine = TemplateEngine::new();
        let out = engine.render(&Fragment::line("int x[2] = {{0}};")).unwrap();
        assert_eq!(out, "int x[2] = {{0}};\n");
    }

    #[test]
    fn test_raw_render_keeps_literal_whitespace() {
        let engine = TemplateEngine::new();
        let tree = Fragment::seq([Fragment::literal("x  "), Fragment::literal("\n\n\n\ny\t")]);
        assert_eq!(engine.render_raw(&Fragment::literal("x  ")).unwrap(), "x  ");
        assert_eq!(engine.render_raw(&tree).unwrap(), "x  \n\n\n\ny\t");

        assert_eq!(engine.render(&Fragment::literal("x  ")).unwrap(), "x\n");
        assert_eq!(engine.render(&tree).unwrap(), "x\n\ny\n");
    }

    #[test]
    fn test_nested_markup() {
        let engine = TemplateEngine::new()
            .with_value("name", "Foo")
            .with_producer("decl", || Ok("struct {{ name }};".to_string()));
        let tree = Fragment::markup("root", "{{decl}} // {{ name }}");
        assert_eq!(engine.render(&tree).unwrap(), "struct Foo; // Foo\n");
    }

    #[test]
    fn test_cycle_reports_chain() {
        let engine = TemplateEngine::new()
            .with_producer("a", || Ok("{{ b }}".to_string()))
            .with_producer("b", || Ok("{{ a }}".to_string()));
        let err = engine.render(&Fragment::markup("root", "{{ a }}")).unwrap_err();
        match err {
            TemplateError::ProducerCycle { chain } => assert_eq!(chain, "root -> a -> b -> a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_depth_limit() {
        let engine = TemplateEngine::new()
            .with_max_depth(2)
            .with_value("leaf", "x")
            .with_producer("mid", || Ok("{{ leaf }}".to_string()));
        let err = engine.render(&Fragment::markup("root", "{{ mid }}")).unwrap_err();
        assert!(matches!(err, TemplateError::DepthExceeded { limit: 2, .. }));
    }

    #[test]
    fn test_unknown_and_malformed() {
        let engine = TemplateEngine::new();
        let err = engine.render(&Fragment::markup("root", "{{ missing }}")).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownProducer { ref name, .. } if name == "missing"));

        let err = engine.render(&Fragment::markup("root", "{{ open")).unwrap_err();
        assert!(matches!(err, TemplateError::MalformedMarkup { .. }));

        let err = engine.render(&Fragment::markup("root", "{{ 1 + 2 }}")).unwrap_err();
        assert!(matches!(err, TemplateError::MalformedMarkup { .. }));
    }

    #[test]
    fn test_producer_error_is_propagated() {
        let engine = TemplateEngine::new().with_producer("bad", || Err("no data".into()));
        let err = engine.render(&Fragment::markup("root", "{{ bad }}")).unwrap_err();
        match err {
            TemplateError::Producer { name, chain, .. } => {
                assert_eq!(name, "bad");
                assert_eq!(chain, "root -> bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_false_conditional_has_no_side_effects() {
        let calls = Cell::new(0);
        let engine = TemplateEngine::new();
        let tree = Fragment::when(
            false,
            Fragment::placeholder("counted", || {
                calls.set(calls.get() + 1);
                Ok("x".to_string())
            }),
        );
        assert_eq!(engine.render(&tree).unwrap(), "");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_predicate_evaluated_once_per_render() {
        let evaluations = Cell::new(0);
        let engine = TemplateEngine::new();
        let tree = Fragment::when_with(
            || {
                evaluations.set(evaluations.get() + 1);
                true
            },
            Fragment::line("body"),
        );
        engine.render(&tree).unwrap();
        assert_eq!(evaluations.get(), 1);
    }

    #[test]
    fn test_sibling_reuse_is_not_a_cycle() {
        let engine = TemplateEngine::new().with_value("n", 4);
        let tree = Fragment::markup("root", "{{ n }} + {{ n }}");
        assert_eq!(engine.render(&tree).unwrap(), "4 + 4\n");
    }
}
