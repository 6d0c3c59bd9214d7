//! Record and Field Descriptors
//!
//! Descriptors are the already-resolved input of the generator: the schema
//! loader produces them, and every later stage reads them without mutation.
//!
//! A [`RecordDescriptor`] is one command. Its fields are kept in declaration
//! order; fields flagged `advanced_only` exist only in the animated variant.
//! Value fields flagged `animatable` additionally get a synthesized
//! [`FieldKind::AnimationHandle`] slot in the animated variant.
//!
//! ```rust,ignore
//! let record = RecordDescriptor::new("SetOpacity")
//!     .with_field(FieldDescriptor::handle("Target"))
//!     .with_field(FieldDescriptor::value("Opacity", ValueType::F64).animatable());
//! ```

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::errors::{CodegenError, Result};
use crate::platform::Platform;

/// Suffix of synthesized animation slot names.
pub const ANIMATION_SLOT_SUFFIX: &str = "Animation";

/// Prefix reserved for generated padding members.
pub const RESERVED_PREFIX: &str = "__";

/// Members the emitter declares on every generated struct.
pub const GENERATED_MEMBERS: [&str; 2] = ["ByteSize", "VerifyLayout"];

/// Keywords of either target language, plus the fixed-width integer types the
/// native form declares members with.
const RESERVED_WORDS: &[&str] = &[
    // C#
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
    // C++
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "char8_t",
    "char16_t", "char32_t", "compl", "concept", "consteval", "constexpr", "constinit",
    "const_cast", "co_await", "co_return", "co_yield", "decltype", "delete", "dynamic_cast",
    "export", "friend", "inline", "mutable", "noexcept", "not", "not_eq", "nullptr", "or",
    "or_eq", "register", "reinterpret_cast", "requires", "signed", "static_assert",
    "static_cast", "template", "thread_local", "typedef", "typeid", "typename", "union",
    "unsigned", "wchar_t", "xor", "xor_eq",
    // <cstdint>
    "int8_t", "int16_t", "int32_t", "int64_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t",
];

// ============================================================================
// Field kinds
// ============================================================================

/// Scalar value types a command field can carry.
///
/// Every size is a power of two and equal to the type's natural alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    U64,
    I64,
    F64,
}

impl ValueType {
    #[must_use]
    pub const fn size(self) -> u32 {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }
}

/// What a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A plain scalar.
    Value(ValueType),
    /// Reference id of another scene object.
    Handle,
    /// Reference id of an animation driving a value field.
    AnimationHandle,
}

impl FieldKind {
    /// Byte size on `platform`. Also the field's alignment.
    #[inline]
    #[must_use]
    pub fn size(self, platform: &Platform) -> u32 {
        match self {
            Self::Value(ty) => ty.size(),
            Self::Handle | Self::AnimationHandle => platform.handle_size,
        }
    }
}

// ============================================================================
// Variants
// ============================================================================

/// Structural variant of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Value and handle fields shared by every variant.
    Base,
    /// Base fields plus animation slots and advanced-only fields.
    Animated,
}

impl Variant {
    pub const ALL: [Self; 2] = [Self::Base, Self::Animated];

    /// Suffix appended to the record name for the generated struct.
    #[must_use]
    pub const fn struct_suffix(self) -> &'static str {
        match self {
            Self::Base => "",
            Self::Animated => "Animated",
        }
    }

    #[must_use]
    pub fn struct_name(self, record: &str) -> String {
        format!("{record}{}", self.struct_suffix())
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Base => "base",
            Self::Animated => "animated",
        })
    }
}

// ============================================================================
// FieldDescriptor
// ============================================================================

/// One field of a command record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// Present only in the animated variant.
    #[serde(default)]
    pub advanced_only: bool,
    /// Gets an animation slot in the animated variant.
    #[serde(default)]
    pub animatable: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            advanced_only: false,
            animatable: false,
        }
    }

    pub fn value(name: impl Into<String>, ty: ValueType) -> Self {
        Self::new(name, FieldKind::Value(ty))
    }

    pub fn handle(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Handle)
    }

    pub fn animation_handle(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::AnimationHandle)
    }

    #[must_use]
    pub fn animatable(mut self) -> Self {
        self.animatable = true;
        self
    }

    #[must_use]
    pub fn advanced(mut self) -> Self {
        self.advanced_only = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn size(&self, platform: &Platform) -> u32 {
        self.kind.size(platform)
    }

    #[inline]
    #[must_use]
    pub fn alignment(&self, platform: &Platform) -> u32 {
        self.kind.size(platform)
    }

    /// The synthesized animation slot for this field, if it gets one.
    #[must_use]
    pub fn animation_slot(&self) -> Option<FieldDescriptor> {
        match self.kind {
            FieldKind::Value(_) if self.animatable && !self.advanced_only => Some(
                FieldDescriptor::animation_handle(format!("{}{ANIMATION_SLOT_SUFFIX}", self.name))
                    .advanced(),
            ),
            _ => None,
        }
    }
}

// ============================================================================
// RecordDescriptor
// ============================================================================

/// A named command record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordDescriptor {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Fields shared by every variant, in declaration order.
    pub fn common_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.advanced_only)
    }

    /// Fields declared as animated-only, in declaration order.
    pub fn advanced_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.advanced_only)
    }

    /// Synthesized animation slots, in the order of their value fields.
    pub fn animation_slots(&self) -> impl Iterator<Item = FieldDescriptor> + '_ {
        self.fields.iter().filter_map(FieldDescriptor::animation_slot)
    }

    /// Checks names, animation flags and field sizes against `platform`.
    ///
    /// The alignment ceiling is left to the layout compiler, which reports
    /// the variant that exceeds it.
    pub fn validate(&self, platform: &Platform) -> Result<()> {
        validate_identifier(&self.name).map_err(|e| e.in_record(&self.name))?;
        if GENERATED_MEMBERS.contains(&self.name.as_str()) {
            let err = CodegenError::InvalidIdentifier {
                name: self.name.clone(),
                reason: "a struct cannot share the name of its generated members",
            };
            return Err(err.in_record(&self.name));
        }
        self.validate_fields(platform)
            .map_err(|e| e.in_record(&self.name))
    }

    fn validate_fields(&self, platform: &Platform) -> Result<()> {
        let mut seen = FxHashSet::default();
        let struct_names = Variant::ALL.map(|variant| variant.struct_name(&self.name));

        for field in self.fields.iter().cloned().chain(self.animation_slots()) {
            validate_identifier(&field.name)?;
            if GENERATED_MEMBERS.contains(&field.name.as_str()) {
                return Err(CodegenError::InvalidIdentifier {
                    name: field.name,
                    reason: "the name is taken by a generated member",
                });
            }
            if struct_names.contains(&field.name) {
                return Err(CodegenError::InvalidIdentifier {
                    name: field.name,
                    reason: "a member cannot share the name of its struct",
                });
            }

            if field.animatable && !matches!(field.kind, FieldKind::Value(_)) {
                return Err(CodegenError::NotAnimatable {
                    record: self.name.clone(),
                    field: field.name,
                });
            }

            let size = field.size(platform);
            if !size.is_power_of_two() {
                return Err(CodegenError::InvalidFieldSize {
                    field: field.name,
                    size,
                });
            }
            if !seen.insert(field.name.clone()) {
                return Err(CodegenError::DuplicateField {
                    record: self.name.clone(),
                    field: field.name,
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// RecordSet
// ============================================================================

/// All records of one generation run, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(default)]
    pub records: Vec<RecordDescriptor>,
}

impl RecordSet {
    #[must_use]
    pub fn new(records: Vec<RecordDescriptor>) -> Self {
        Self { records }
    }

    /// Decodes a descriptor set from its JSON interchange form.
    pub fn from_json(source: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(source)?;
        log::debug!("Loaded {} record descriptors", set.records.len());
        Ok(set)
    }

    /// Validates every record and checks that record names, and the struct
    /// names generated from them, are unique.
    pub fn validate(&self, platform: &Platform) -> Result<()> {
        let mut seen = FxHashSet::default();
        let mut structs: FxHashMap<String, &str> = FxHashMap::default();

        for record in &self.records {
            record.validate(platform)?;
            if !seen.insert(record.name.as_str()) {
                return Err(CodegenError::DuplicateRecord(record.name.clone()));
            }
            for variant in Variant::ALL {
                let struct_name = variant.struct_name(&record.name);
                if let Some(first) = structs.insert(struct_name.clone(), &record.name) {
                    return Err(CodegenError::StructNameCollision {
                        struct_name,
                        first: first.to_string(),
                        second: record.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordDescriptor> {
        self.records.iter()
    }
}

/// Checks that `name` can be used verbatim as a member or type name.
pub fn validate_identifier(name: &str) -> Result<()> {
    let reject = |reason| {
        Err(CodegenError::InvalidIdentifier {
            name: name.to_string(),
            reason,
        })
    };

    let mut chars = name.chars();
    match chars.next() {
        None => return reject("name is empty"),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return reject("must start with an ASCII letter or underscore");
        }
        Some(_) => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return reject("may only contain ASCII letters, digits and underscores");
    }
    if name.starts_with(RESERVED_PREFIX) {
        return reject("the '__' prefix is reserved for generated names");
    }
    if RESERVED_WORDS.contains(&name) {
        return reject("reserved word in C# or C++");
    }
    Ok(())
}
