//! Dual-target record emitter.
//!
//! Turns compiled layouts into source text for two independent compilers:
//!
//! - [`dialect`]: the [`TargetDialect`] seam and its [`Managed`] (explicit
//!   offsets) and [`Native`] (sequential) implementations
//! - [`model`]: the member list both dialects render
//! - [`record`]: per-record rendering through the fragment engine
//! - [`file`]: whole-file assembly from embedded templates

pub mod dialect;
pub mod file;
pub mod model;
pub mod record;

pub use dialect::{Managed, Native, TargetDialect};
pub use file::{GeneratedFile, assemble};
pub use model::{DeclaredMember, MemberType, PADDING_PREFIX, StructModel};
pub use record::{RecordEmitter, RenderedRecord, RenderedStruct};
