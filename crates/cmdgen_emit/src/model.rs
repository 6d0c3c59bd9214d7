//! Struct model shared by both renderings.
//!
//! A [`StructModel`] is the member list derived from one
//! [`CompiledLayout`]. Both dialects render the same model, which is what
//! keeps their member lists identical.

use cmdgen_core::{FieldKind, ValueType, Variant};
use cmdgen_layout::{CompiledLayout, EntrySlot};

/// Prefix of generated padding member names.
pub const PADDING_PREFIX: &str = "__pad";

/// Logical type of a declared member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberType {
    Value(ValueType),
    Handle,
    AnimationHandle,
    /// Anonymous byte filler of the given length.
    Padding(u32),
}

impl From<FieldKind> for MemberType {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Value(ty) => Self::Value(ty),
            FieldKind::Handle => Self::Handle,
            FieldKind::AnimationHandle => Self::AnimationHandle,
        }
    }
}

/// One member of a generated struct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredMember {
    pub name: String,
    pub ty: MemberType,
    pub offset: u32,
}

impl DeclaredMember {
    #[inline]
    #[must_use]
    pub fn is_padding(&self) -> bool {
        matches!(self.ty, MemberType::Padding(_))
    }
}

/// Everything a dialect needs to render one record variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructModel {
    pub name: String,
    pub record: String,
    pub variant: Variant,
    pub total_size: u32,
    pub members: Vec<DeclaredMember>,
}

impl StructModel {
    #[must_use]
    pub fn from_layout(layout: &CompiledLayout) -> Self {
        let mut pad_index = 0;
        let members = layout
            .entries
            .iter()
            .map(|entry| match &entry.slot {
                EntrySlot::Field(field) => DeclaredMember {
                    name: field.name.clone(),
                    ty: field.kind.into(),
                    offset: entry.offset,
                },
                EntrySlot::Padding => {
                    let name = format!("{PADDING_PREFIX}{pad_index}");
                    pad_index += 1;
                    DeclaredMember {
                        name,
                        ty: MemberType::Padding(entry.size),
                        offset: entry.offset,
                    }
                }
            })
            .collect();

        Self {
            name: layout.struct_name(),
            record: layout.record.clone(),
            variant: layout.variant,
            total_size: layout.total_size,
            members,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn has_padding(&self) -> bool {
        self.members.iter().any(DeclaredMember::is_padding)
    }

    pub fn fields(&self) -> impl Iterator<Item = &DeclaredMember> {
        self.members.iter().filter(|member| !member.is_padding())
    }
}
