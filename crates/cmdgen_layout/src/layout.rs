//! Compiled layouts.

use cmdgen_core::{FieldDescriptor, Variant};

/// What occupies a layout entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntrySlot {
    Field(FieldDescriptor),
    /// Anonymous filler. Never carries field identity.
    Padding,
}

/// One contiguous byte range of a compiled record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutEntry {
    pub offset: u32,
    pub size: u32,
    pub slot: EntrySlot,
}

impl LayoutEntry {
    #[inline]
    #[must_use]
    pub fn end(&self) -> u32 {
        self.offset + self.size
    }

    #[inline]
    #[must_use]
    pub fn is_padding(&self) -> bool {
        matches!(self.slot, EntrySlot::Padding)
    }

    #[inline]
    #[must_use]
    pub fn field(&self) -> Option<&FieldDescriptor> {
        match &self.slot {
            EntrySlot::Field(field) => Some(field),
            EntrySlot::Padding => None,
        }
    }
}

/// The finalized layout of one (record, variant) pair.
///
/// Entries are contiguous, start at offset 0 and end at `total_size`, except
/// for an empty record: it has no entries and a total size of 1, because the
/// native representation cannot express a zero-sized struct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompiledLayout {
    pub record: String,
    pub variant: Variant,
    pub entries: Vec<LayoutEntry>,
    pub total_size: u32,
    /// Packing boundary; `total_size` is a multiple of it.
    pub alignment: u32,
}

impl CompiledLayout {
    /// Name of the generated struct for this variant.
    #[must_use]
    pub fn struct_name(&self) -> String {
        self.variant.struct_name(&self.record)
    }

    /// `true` when the record has no fields in this variant.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Non-padding entries, in layout order.
    pub fn fields(&self) -> impl Iterator<Item = (&LayoutEntry, &FieldDescriptor)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.field().map(|field| (entry, field)))
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&LayoutEntry> {
        self.fields()
            .find(|(_, field)| field.name == name)
            .map(|(entry, _)| entry)
    }

    #[must_use]
    pub fn has_padding(&self) -> bool {
        self.entries.iter().any(LayoutEntry::is_padding)
    }

    /// Total bytes spent on padding entries.
    #[must_use]
    pub fn padding_bytes(&self) -> u32 {
        self.entries
            .iter()
            .filter(|entry| entry.is_padding())
            .map(|entry| entry.size)
            .sum()
    }
}
