//! Alignment Cursor
//!
//! Tracks the running byte offset of a record while fields are placed,
//! inserting a padding entry in front of any field that would otherwise be
//! misaligned and, at the end, a trailing padding entry that rounds the record
//! up to its packing boundary.

use cmdgen_core::{CodegenError, FieldDescriptor, Platform, Result};

use crate::layout::{EntrySlot, LayoutEntry};

/// Padding needed to move `offset` onto a multiple of `alignment`, and the
/// aligned offset.
///
/// `alignment` must be a non-zero power of two.
#[inline]
#[must_use]
pub fn align(offset: u32, alignment: u32) -> (u32, u32) {
    let rem = offset % alignment;
    if rem == 0 {
        (0, offset)
    } else {
        let padding = alignment - rem;
        (padding, offset + padding)
    }
}

/// Padding that rounds a record ending at `offset` up to `struct_alignment`.
#[inline]
#[must_use]
pub fn trailing_padding(offset: u32, struct_alignment: u32) -> u32 {
    align(offset, struct_alignment).0
}

/// Entries produced by a finished cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedEntries {
    pub entries: Vec<LayoutEntry>,
    /// Offset after the last entry, trailing padding included.
    pub size: u32,
    /// Packing boundary the size was rounded to.
    pub alignment: u32,
}

/// Stateful offset tracker for one record variant.
#[derive(Debug, Clone)]
pub struct AlignmentCursor {
    platform: Platform,
    offset: u32,
    observed_alignment: u32,
    entries: Vec<LayoutEntry>,
}

impl AlignmentCursor {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            offset: 0,
            observed_alignment: 1,
            entries: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Places `field` at the next suitably aligned offset and returns that offset.
    ///
    /// Fails if the field's alignment is not a power of two or exceeds the
    /// platform ceiling; both mean the descriptor is wrong.
    pub fn place(&mut self, field: FieldDescriptor) -> Result<u32> {
        let size = field.size(&self.platform);
        let alignment = field.alignment(&self.platform);

        if !alignment.is_power_of_two() {
            return Err(CodegenError::InvalidFieldSize {
                field: field.name,
                size,
            });
        }
        if alignment > self.platform.max_alignment {
            return Err(CodegenError::AlignmentExceedsCeiling {
                field: field.name,
                alignment,
                ceiling: self.platform.max_alignment,
            });
        }

        let (padding, offset) = align(self.offset, alignment);
        if padding > 0 {
            log::trace!("Padding {padding} bytes before '{}' at {}", field.name, self.offset);
            self.entries.push(LayoutEntry {
                offset: self.offset,
                size: padding,
                slot: EntrySlot::Padding,
            });
        }

        self.entries.push(LayoutEntry {
            offset,
            size,
            slot: EntrySlot::Field(field),
        });
        self.offset = offset + size;
        self.observed_alignment = self.observed_alignment.max(alignment);
        Ok(offset)
    }

    /// Appends trailing padding and returns the finished entries.
    #[must_use]
    pub fn finish(mut self) -> PackedEntries {
        let alignment = self.platform.struct_alignment(self.observed_alignment);
        let trailing = trailing_padding(self.offset, alignment);
        if trailing > 0 {
            self.entries.push(LayoutEntry {
                offset: self.offset,
                size: trailing,
                slot: EntrySlot::Padding,
            });
        }
        PackedEntries {
            entries: self.entries,
            size: self.offset + trailing,
            alignment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdgen_core::ValueType;

    #[test]
    fn test_align() {
        assert_eq!(align(0, 8), (0, 0));
        assert_eq!(align(12, 4), (0, 12));
        assert_eq!(align(12, 8), (4, 16));
        assert_eq!(align(1, 2), (1, 2));
        assert_eq!(align(5, 1), (0, 5));
    }

    #[test]
    fn test_trailing_padding() {
        assert_eq!(trailing_padding(12, 8), 4);
        assert_eq!(trailing_padding(16, 8), 0);
        assert_eq!(trailing_padding(0, 4), 0);
    }

    #[test]
    fn test_padding_inserted_before_misaligned_field() {
        let mut cursor = AlignmentCursor::new(Platform::default());
        assert_eq!(cursor.place(FieldDescriptor::value("a", ValueType::U8)).unwrap(), 0);
        assert_eq!(cursor.place(FieldDescriptor::value("b", ValueType::U32)).unwrap(), 4);

        let packed = cursor.finish();
        let sizes: Vec<_> = packed.entries.iter().map(|e| (e.offset, e.size, e.is_padding())).collect();
        assert_eq!(sizes, [(0, 1, false), (1, 3, true), (4, 4, false)]);
        assert_eq!(packed.size, 8);
        assert_eq!(packed.alignment, 4);
    }

    #[test]
    fn test_trailing_padding_uses_minimum_boundary() {
        let mut cursor = AlignmentCursor::new(Platform::default());
        cursor.place(FieldDescriptor::value("flag", ValueType::Bool)).unwrap();
        let packed = cursor.finish();
        assert_eq!(packed.size, 4);
        assert!(packed.entries[1].is_padding());
        assert_eq!(packed.entries[1].size, 3);
    }

    #[test]
    fn test_no_zero_sized_padding() {
        let mut cursor = AlignmentCursor::new(Platform::default());
        cursor.place(FieldDescriptor::value("a", ValueType::U64)).unwrap();
        cursor.place(FieldDescriptor::value("b", ValueType::U32)).unwrap();
        cursor.place(FieldDescriptor::value("c", ValueType::U32)).unwrap();
        let packed = cursor.finish();
        assert!(packed.entries.iter().all(|e| !e.is_padding()));
        assert_eq!(packed.size, 16);
    }

    #[test]
    fn test_alignment_over_ceiling_fails() {
        let mut cursor = AlignmentCursor::new(Platform::X86);
        let err = cursor.place(FieldDescriptor::value("d", ValueType::F64)).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::AlignmentExceedsCeiling { alignment: 8, ceiling: 4, .. }
        ));
    }
}
