//! Fragment-tree template engine.
//!
//! Generators describe their output as a tree of [`Fragment`]s (literal text,
//! producer placeholders, generation-time conditionals) and hand it to a
//! [`TemplateEngine`], which concatenates everything in order, expands
//! `{{ name }}` markup found in producer output, and normalizes whitespace.
//!
//! Nothing here knows what is being generated; the record emitter and every
//! per-entity generator share the same engine.

pub mod engine;
pub mod error;
pub mod fragment;
pub mod whitespace;

pub use engine::{DEFAULT_MAX_DEPTH, TemplateEngine};
pub use error::{ProducerError, TemplateError};
pub use fragment::{Fragment, Producer};
