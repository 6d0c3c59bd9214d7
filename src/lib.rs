//! # cmdgen
//!
//! Layout compiler and source generator for command records that cross a
//! managed/native boundary as raw bytes.
//!
//! One layout computation per record variant feeds two renderings: a C#
//! struct with explicit field offsets and a C++ struct relying on sequential
//! packing. Both carry a size assertion, so any disagreement fails the
//! consumer's build.
//!
//! ```rust,ignore
//! use cmdgen::{CommandGenerator, FieldDescriptor, GeneratorConfig, RecordDescriptor, RecordSet, ValueType};
//!
//! let set = RecordSet::new(vec![
//!     RecordDescriptor::new("SetOpacity")
//!         .with_field(FieldDescriptor::handle("Target"))
//!         .with_field(FieldDescriptor::value("Opacity", ValueType::F32).animatable()),
//! ]);
//!
//! let sources = CommandGenerator::new(GeneratorConfig::default())?.generate(&set)?;
//! for file in sources.files() {
//!     std::fs::write(&file.name, &file.contents)?;
//! }
//! ```

pub mod config;
pub mod generator;

pub use cmdgen_emit as emit;
pub use cmdgen_layout as layout;
pub use cmdgen_template as template;

pub use cmdgen_core::{
    CodegenError, FieldDescriptor, FieldKind, Platform, RecordDescriptor, RecordSet, Result,
    ValueType, Variant,
};
pub use cmdgen_emit::{GeneratedFile, Managed, Native, TargetDialect};
pub use cmdgen_layout::{CompiledLayout, LayoutCompiler};
pub use cmdgen_template::{Fragment, TemplateEngine};
pub use config::GeneratorConfig;
pub use generator::{CommandGenerator, GeneratedSources, RecordSummary};
