//! Struct Layout Compiler
//!
//! Assigns an offset to every field of a record variant so that two
//! unrelated target compilers agree on the result: the managed side places
//! fields at explicit offsets, the native side declares them in order and
//! relies on its default packing.
//!
//! # Ordering
//!
//! Fields are stable-sorted by descending size. With power-of-two sizes this
//! puts every field at a multiple of its own size, so the sequential
//! rendering needs no implicit padding and both sides land on the same
//! offsets. The cursor still runs over the sorted list: it is what makes
//! irregular inputs come out right, and it produces the trailing padding.
//!
//! # Variants
//!
//! The base variant holds the non-advanced `Value` and `Handle` fields. The
//! animated variant lays out exactly the same base group first and then
//! continues with its extra fields (declared animation handles, synthesized
//! animation slots and advanced-only fields), sorted the same way. Base field
//! offsets are therefore identical in both variants.

use cmdgen_core::{FieldDescriptor, FieldKind, Platform, RecordDescriptor, Result, Variant};
use smallvec::SmallVec;

use crate::cursor::AlignmentCursor;
use crate::layout::CompiledLayout;

/// Size asserted for a record without fields.
pub const EMPTY_RECORD_SIZE: u32 = 1;

type FieldGroup = SmallVec<[FieldDescriptor; 8]>;

/// Both variants of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayouts {
    pub base: CompiledLayout,
    pub animated: CompiledLayout,
}

impl RecordLayouts {
    #[must_use]
    pub fn get(&self, variant: Variant) -> &CompiledLayout {
        match variant {
            Variant::Base => &self.base,
            Variant::Animated => &self.animated,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledLayout> {
        [&self.base, &self.animated].into_iter()
    }
}

/// Computes record layouts for one platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutCompiler {
    platform: Platform,
}

impl LayoutCompiler {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    #[inline]
    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Compiles one variant of `record`.
    ///
    /// Name uniqueness is not checked here; run
    /// [`RecordDescriptor::validate`] first. Alignment problems are still
    /// reported, with the record and variant attached.
    pub fn compile(&self, record: &RecordDescriptor, variant: Variant) -> Result<CompiledLayout> {
        self.compile_variant(record, variant)
            .map_err(|e| e.in_variant(&record.name, variant))
    }

    /// Compiles both variants of `record`.
    pub fn compile_record(&self, record: &RecordDescriptor) -> Result<RecordLayouts> {
        Ok(RecordLayouts {
            base: self.compile(record, Variant::Base)?,
            animated: self.compile(record, Variant::Animated)?,
        })
    }

    fn compile_variant(&self, record: &RecordDescriptor, variant: Variant) -> Result<CompiledLayout> {
        let mut cursor = AlignmentCursor::new(self.platform);

        for field in self.sorted(base_fields(record)) {
            cursor.place(field)?;
        }
        if variant == Variant::Animated {
            for field in self.sorted(animated_extras(record)) {
                cursor.place(field)?;
            }
        }

        let packed = cursor.finish();
        let total_size = if packed.entries.is_empty() {
            log::debug!("{} ({variant}) has no fields, asserting size {EMPTY_RECORD_SIZE}", record.name);
            EMPTY_RECORD_SIZE
        } else {
            packed.size
        };

        let layout = CompiledLayout {
            record: record.name.clone(),
            variant,
            entries: packed.entries,
            total_size,
            alignment: packed.alignment,
        };
        log::debug!(
            "Compiled {} ({variant}): {} entries, {} bytes ({} padding)",
            record.name,
            layout.entries.len(),
            layout.total_size,
            layout.padding_bytes()
        );
        Ok(layout)
    }

    /// Stable sort by descending size; ties keep declaration order.
    fn sorted(&self, mut fields: FieldGroup) -> FieldGroup {
        fields.sort_by_key(|field| std::cmp::Reverse(field.size(&self.platform)));
        fields
    }
}

/// Fields of the base variant, in declaration order.
fn base_fields(record: &RecordDescriptor) -> FieldGroup {
    record
        .common_fields()
        .filter(|field| match field.kind {
            FieldKind::Value(_) | FieldKind::Handle => true,
            FieldKind::AnimationHandle => false,
        })
        .cloned()
        .collect()
}

/// Fields the animated variant adds on top of the base group, in
/// declaration order. A synthesized animation slot directly follows its
/// value field.
fn animated_extras(record: &RecordDescriptor) -> FieldGroup {
    let mut extras = FieldGroup::new();
    for field in &record.fields {
        let extra = field.advanced_only
            || match field.kind {
                FieldKind::AnimationHandle => true,
                FieldKind::Value(_) | FieldKind::Handle => false,
            };
        if extra {
            extras.push(field.clone());
        }
        extras.extend(field.animation_slot());
    }
    extras
}
