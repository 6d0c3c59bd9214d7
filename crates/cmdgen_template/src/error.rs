//! Template Engine Errors
//!
//! Every failure in the engine is a generator authoring bug (a producer that
//! loops, fails, or references something that does not exist), so all
//! variants carry the producer chain that was active when the problem was
//! found.

use thiserror::Error;

/// Boxed error returned by a failing producer.
pub type ProducerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while rendering a fragment tree.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A producer (directly or through markup) re-entered itself.
    #[error("Producer cycle detected: {chain}")]
    ProducerCycle {
        /// Producer chain, outermost first, ending with the repeated producer.
        chain: String,
    },

    /// Markup nesting went deeper than the engine allows.
    #[error("Producer nesting exceeds depth {limit}: {chain}")]
    DepthExceeded {
        /// Configured depth limit.
        limit: usize,
        /// Producer chain at the point of overflow.
        chain: String,
    },

    /// Markup referenced a producer that was never registered.
    #[error("Unknown producer '{name}' referenced from {chain}")]
    UnknownProducer {
        /// The unresolved name.
        name: String,
        /// Producer chain that emitted the reference.
        chain: String,
    },

    /// Producer output contained an unterminated or non-identifier placeholder.
    #[error("Malformed markup in output of {chain}: {detail}")]
    MalformedMarkup {
        /// Producer chain whose output was malformed.
        chain: String,
        /// What was wrong.
        detail: String,
    },

    /// A producer returned an error.
    #[error("Producer '{name}' failed ({chain}): {source}")]
    Producer {
        /// Failing producer.
        name: String,
        /// Producer chain, outermost first.
        chain: String,
        /// Error reported by the producer.
        #[source]
        source: ProducerError,
    },
}

/// Alias for `Result<T, TemplateError>`.
pub type Result<T> = std::result::Result<T, TemplateError>;
