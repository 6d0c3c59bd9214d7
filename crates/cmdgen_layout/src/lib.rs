//! Struct layout compiler for command records.
//!
//! One layout computation feeds both target renderings:
//!
//! - [`cursor`]: offset tracking and padding insertion
//! - [`compiler`]: field selection, ordering and per-variant compilation
//! - [`layout`]: the immutable result ([`CompiledLayout`])
//! - [`sequential`]: model of the native compiler's default packing, used to
//!   prove both renderings agree

pub mod compiler;
pub mod cursor;
pub mod layout;
pub mod sequential;

pub use compiler::{EMPTY_RECORD_SIZE, LayoutCompiler, RecordLayouts};
pub use cursor::{AlignmentCursor, align, trailing_padding};
pub use layout::{CompiledLayout, EntrySlot, LayoutEntry};
