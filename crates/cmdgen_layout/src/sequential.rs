//! Sequential Packing Model
//!
//! Reproduces how the native compiler lays out a struct whose members are
//! declared in order without offset annotations: each member goes to the
//! next multiple of its natural alignment, the struct size is rounded up to
//! the widest member alignment, and a struct without members still occupies
//! one byte.
//!
//! The generator runs every compiled layout through this model before any
//! text is emitted, so a divergence between the two renderings is caught at
//! generation time rather than only by the generated assertions.

use cmdgen_core::{CodegenError, Platform, Result};

use crate::compiler::EMPTY_RECORD_SIZE;
use crate::cursor::align;
use crate::layout::{CompiledLayout, EntrySlot};

/// A declared member as the native compiler sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Member {
    pub size: u32,
    pub alignment: u32,
}

/// Result of sequential packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequentialLayout {
    pub offsets: Vec<u32>,
    pub size: u32,
    pub alignment: u32,
}

/// Lays out `members` in declaration order with natural alignment.
#[must_use]
pub fn pack(members: &[Member]) -> SequentialLayout {
    let mut offsets = Vec::with_capacity(members.len());
    let mut offset = 0;
    let mut alignment = 1;

    for member in members {
        let (_, aligned) = align(offset, member.alignment);
        offsets.push(aligned);
        offset = aligned + member.size;
        alignment = alignment.max(member.alignment);
    }

    let size = if members.is_empty() {
        EMPTY_RECORD_SIZE
    } else {
        align(offset, alignment).1
    };
    SequentialLayout {
        offsets,
        size,
        alignment,
    }
}

/// The members the sequential rendering of `layout` declares.
///
/// Padding entries are byte arrays, so they have an alignment of one.
#[must_use]
pub fn members_of(layout: &CompiledLayout, platform: &Platform) -> Vec<Member> {
    layout
        .entries
        .iter()
        .map(|entry| match &entry.slot {
            EntrySlot::Field(field) => Member {
                size: field.size(platform),
                alignment: field.alignment(platform),
            },
            EntrySlot::Padding => Member {
                size: entry.size,
                alignment: 1,
            },
        })
        .collect()
}

/// Checks that sequential packing of `layout`'s members reproduces its
/// explicit offsets and total size.
pub fn verify(layout: &CompiledLayout, platform: &Platform) -> Result<()> {
    let packed = pack(&members_of(layout, platform));

    for (entry, &offset) in layout.entries.iter().zip(&packed.offsets) {
        if entry.offset != offset {
            let what = entry.field().map_or("padding", |field| field.name.as_str());
            return Err(CodegenError::LayoutDivergence(format!(
                "{what} is at explicit offset {} but sequential offset {offset}",
                entry.offset
            )));
        }
    }
    if packed.size != layout.total_size {
        return Err(CodegenError::LayoutDivergence(format!(
            "explicit size {} but sequential size {}",
            layout.total_size, packed.size
        )));
    }
    log::trace!("{} verified against sequential packing", layout.struct_name());
    Ok(())
}
