//! Error Types
//!
//! This module defines the error type shared by every stage of generation.
//!
//! # Overview
//!
//! [`CodegenError`] covers:
//! - Schema errors (bad descriptors or platform rules), found before layout
//! - Layout divergence between the explicit and sequential renderings
//! - Template engine misuse and file assembly failures
//!
//! None of these are transient: each one is a bug in the descriptors or in a
//! generator, so the whole run aborts on the first error. Errors raised while
//! processing a record are wrapped with the record name (and variant, when
//! one applies) so the diagnostic points at the offending record.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cmdgen_core::errors::{CodegenError, Result};
//!
//! fn compile_all() -> Result<()> {
//!     Ok(())
//! }
//! ```

use cmdgen_template::TemplateError;
use thiserror::Error;

use crate::descriptor::Variant;

/// The main error type for cmdgen.
#[derive(Error, Debug)]
pub enum CodegenError {
    // ========================================================================
    // Schema Errors
    // ========================================================================
    /// A field needs more alignment than the platform allows.
    #[error(
        "Field '{field}' requires {alignment}-byte alignment, above the platform ceiling of {ceiling}"
    )]
    AlignmentExceedsCeiling {
        /// Offending field
        field: String,
        /// Alignment the field requires
        alignment: u32,
        /// Platform ceiling
        ceiling: u32,
    },

    /// A field size is not a power of two.
    #[error("Field '{field}' has size {size}, which is not a power of two")]
    InvalidFieldSize {
        /// Offending field
        field: String,
        /// Declared size
        size: u32,
    },

    /// A field name occurs twice in one record (across both variants).
    #[error("Record '{record}' declares field '{field}' more than once")]
    DuplicateField {
        /// Owning record
        record: String,
        /// Repeated name
        field: String,
    },

    /// A record name occurs twice in one record set.
    #[error("Record '{0}' is declared more than once")]
    DuplicateRecord(String),

    /// Two records generate a struct with the same name.
    #[error("Records '{first}' and '{second}' both generate struct '{struct_name}'")]
    StructNameCollision {
        /// Generated struct name
        struct_name: String,
        /// Record that claimed the name first
        first: String,
        /// Record that collided with it
        second: String,
    },

    /// A record or field name cannot be used as a member name.
    #[error("'{name}' is not a valid name: {reason}")]
    InvalidIdentifier {
        /// Rejected name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// A non-value field was marked animatable.
    #[error("Field '{field}' of record '{record}' is marked animatable but is not a value field")]
    NotAnimatable {
        /// Owning record
        record: String,
        /// Offending field
        field: String,
    },

    /// The platform rules are inconsistent.
    #[error("Invalid platform configuration: {0}")]
    InvalidPlatform(String),

    // ========================================================================
    // Layout Errors
    // ========================================================================
    /// The explicit-offset and sequential renderings disagree.
    #[error("Layout divergence: {0}")]
    LayoutDivergence(String),

    // ========================================================================
    // Emission Errors
    // ========================================================================
    /// Fragment rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// File template loading or rendering failed.
    #[error("File template error: {0}")]
    FileTemplate(String),

    /// Descriptor or configuration JSON could not be decoded.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Context
    // ========================================================================
    /// An error raised while validating a record.
    #[error("Record '{record}': {source}")]
    Record {
        /// Record being processed
        record: String,
        /// Underlying error
        #[source]
        source: Box<CodegenError>,
    },

    /// An error raised while compiling or emitting one variant of a record.
    #[error("Record '{record}' ({variant} variant): {source}")]
    RecordVariant {
        /// Record being processed
        record: String,
        /// Variant being processed
        variant: Variant,
        /// Underlying error
        #[source]
        source: Box<CodegenError>,
    },
}

impl CodegenError {
    /// Attaches the record name, unless the error already carries one.
    #[must_use]
    pub fn in_record(self, record: &str) -> Self {
        match self {
            Self::Record { .. } | Self::RecordVariant { .. } => self,
            other => Self::Record {
                record: record.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Attaches the record name and variant, unless the error already carries them.
    #[must_use]
    pub fn in_variant(self, record: &str, variant: Variant) -> Self {
        match self {
            Self::Record { .. } | Self::RecordVariant { .. } => self,
            other => Self::RecordVariant {
                record: record.to_string(),
                variant,
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, skipping record context.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Record { source, .. } | Self::RecordVariant { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Alias for `Result<T, CodegenError>`.
pub type Result<T> = std::result::Result<T, CodegenError>;
