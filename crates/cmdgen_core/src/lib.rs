//! Core types shared by every cmdgen stage.
//!
//! - [`descriptor`]: records, fields, kinds and variants
//! - [`platform`]: layout rules of the consumer platform
//! - [`errors`]: the shared error type

pub mod descriptor;
pub mod errors;
pub mod platform;

pub use descriptor::{
    ANIMATION_SLOT_SUFFIX, FieldDescriptor, GENERATED_MEMBERS, FieldKind, RecordDescriptor, RecordSet, ValueType,
    Variant,
};
pub use errors::{CodegenError, Result};
pub use platform::Platform;
