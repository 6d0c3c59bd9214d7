//! Target Dialects
//!
//! A [`TargetDialect`] turns a [`StructModel`] into a fragment tree for one
//! target language. Two dialects exist:
//!
//! | Dialect | Layout form | Padding | Size check |
//! |---------|-------------|---------|------------|
//! | [`Managed`] | explicit `[FieldOffset]` per member | `fixed byte` buffer | `VerifyLayout`, run by a module initializer |
//! | [`Native`]  | sequential declaration order        | `uint8_t` array     | `static_assert` |
//!
//! Every dialect declares the model's members in model order, so the two
//! renderings never disagree on names, types or count.

use cmdgen_core::{Platform, ValueType};
use cmdgen_template::Fragment;

use crate::model::{DeclaredMember, MemberType, StructModel};

/// One target language.
///
/// Struct fragments may use the markup names `struct_name`, `byte_size`,
/// `record` and `variant`; the record emitter registers producers for them.
pub trait TargetDialect: Send + Sync {
    /// Short label used in logs and summaries.
    fn name(&self) -> &'static str;

    /// Extension of the assembled source file, without the dot.
    fn file_extension(&self) -> &'static str;

    /// Template used to assemble the full source file.
    fn file_template(&self) -> &'static str;

    /// Whether every member carries its offset in the text.
    fn explicit_offsets(&self) -> bool;

    fn value_type_name(&self, ty: ValueType) -> &'static str;

    /// Unsigned integer type of the given byte width.
    fn unsigned_type_name(&self, width: u32) -> &'static str;

    /// Namespace as written in this language (`a.b` or `a::b`).
    fn namespace(&self, dotted: &str) -> String;

    /// One member declaration, without trailing newline.
    fn member_declaration(&self, member: &DeclaredMember, platform: &Platform) -> String;

    /// Fragment tree for a whole struct definition plus its size check.
    fn struct_fragment<'a>(&self, model: &'a StructModel, platform: &Platform) -> Fragment<'a>;

    /// Type name of a member as this dialect writes it.
    fn type_name(&self, ty: MemberType, platform: &Platform) -> &'static str {
        match ty {
            MemberType::Value(value) => self.value_type_name(value),
            MemberType::Handle | MemberType::AnimationHandle => {
                self.unsigned_type_name(platform.handle_size)
            }
            MemberType::Padding(_) => self.unsigned_type_name(1),
        }
    }
}

/// Member declarations of `model`, one line each, in model order.
fn member_lines<'a>(
    dialect: &dyn TargetDialect,
    model: &StructModel,
    platform: &Platform,
) -> Vec<Fragment<'a>> {
    model
        .members
        .iter()
        .map(|member| Fragment::line(dialect.member_declaration(member, platform)))
        .collect()
}

// ============================================================================
// Managed (explicit offsets)
// ============================================================================

/// C# struct with `LayoutKind.Explicit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Managed;

impl TargetDialect for Managed {
    fn name(&self) -> &'static str {
        "managed"
    }

    fn file_extension(&self) -> &'static str {
        "cs"
    }

    fn file_template(&self) -> &'static str {
        "managed.cs.jinja"
    }

    fn explicit_offsets(&self) -> bool {
        true
    }

    fn value_type_name(&self, ty: ValueType) -> &'static str {
        match ty {
            ValueType::Bool => "bool",
            ValueType::U8 => "byte",
            ValueType::I8 => "sbyte",
            ValueType::U16 => "ushort",
            ValueType::I16 => "short",
            ValueType::U32 => "uint",
            ValueType::I32 => "int",
            ValueType::F32 => "float",
            ValueType::U64 => "ulong",
            ValueType::I64 => "long",
            ValueType::F64 => "double",
        }
    }

    fn unsigned_type_name(&self, width: u32) -> &'static str {
        match width {
            1 => "byte",
            2 => "ushort",
            4 => "uint",
            _ => "ulong",
        }
    }

    fn namespace(&self, dotted: &str) -> String {
        dotted.to_string()
    }

    fn member_declaration(&self, member: &DeclaredMember, platform: &Platform) -> String {
        match member.ty {
            MemberType::Padding(len) => format!(
                "[FieldOffset({})] private fixed byte {}[{len}];",
                member.offset, member.name
            ),
            ty => format!(
                "[FieldOffset({})] public {} {};",
                member.offset,
                self.type_name(ty, platform),
                member.name
            ),
        }
    }

    fn struct_fragment<'a>(&self, model: &'a StructModel, platform: &Platform) -> Fragment<'a> {
        let members = member_lines(self, model, platform);
        let has_members = !members.is_empty();

        Fragment::seq([
            Fragment::when(
                model.is_empty(),
                Fragment::line("// No fields; the size is pinned to one byte to match the native side."),
            ),
            Fragment::markup(
                "layout_attribute",
                "[StructLayout(LayoutKind.Explicit, Size = {{ byte_size }})]\n",
            ),
            Fragment::seq([
                Fragment::literal("public "),
                // Fixed-size buffers need an unsafe context.
                Fragment::when(model.has_padding(), Fragment::literal("unsafe ")),
                Fragment::markup("struct_header", "partial struct {{ struct_name }}\n"),
            ]),
            Fragment::line("{"),
            Fragment::indented(
                1,
                Fragment::seq([
                    Fragment::markup("size_constant", "public const int ByteSize = {{ byte_size }};\n"),
                    Fragment::when(
                        has_members,
                        Fragment::seq([Fragment::line(""), Fragment::seq(members)]),
                    ),
                    Fragment::line(""),
                    // Called from the file's module initializer.
                    Fragment::line("internal static void VerifyLayout()"),
                    Fragment::line("{"),
                    Fragment::indented(
                        1,
                        Fragment::seq([
                            Fragment::markup(
                                "size_check",
                                "if (Unsafe.SizeOf<{{ struct_name }}>() != ByteSize)\n",
                            ),
                            Fragment::line("{"),
                            Fragment::indented(
                                1,
                                Fragment::markup(
                                    "size_assertion",
                                    "throw new InvalidOperationException(\
                                     \"{{ struct_name }} ({{ variant }}) must be {{ byte_size }} bytes\");\n",
                                ),
                            ),
                            Fragment::line("}"),
                        ]),
                    ),
                    Fragment::line("}"),
                ]),
            ),
            Fragment::line("}"),
        ])
    }
}

// ============================================================================
// Native (sequential)
// ============================================================================

/// C++ struct relying on default member packing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Native;

impl TargetDialect for Native {
    fn name(&self) -> &'static str {
        "native"
    }

    fn file_extension(&self) -> &'static str {
        "hpp"
    }

    fn file_template(&self) -> &'static str {
        "native.hpp.jinja"
    }

    fn explicit_offsets(&self) -> bool {
        false
    }

    fn value_type_name(&self, ty: ValueType) -> &'static str {
        match ty {
            ValueType::Bool => "bool",
            ValueType::U8 => "uint8_t",
            ValueType::I8 => "int8_t",
            ValueType::U16 => "uint16_t",
            ValueType::I16 => "int16_t",
            ValueType::U32 => "uint32_t",
            ValueType::I32 => "int32_t",
            ValueType::F32 => "float",
            ValueType::U64 => "uint64_t",
            ValueType::I64 => "int64_t",
            ValueType::F64 => "double",
        }
    }

    fn unsigned_type_name(&self, width: u32) -> &'static str {
        match width {
            1 => "uint8_t",
            2 => "uint16_t",
            4 => "uint32_t",
            _ => "uint64_t",
        }
    }

    fn namespace(&self, dotted: &str) -> String {
        dotted.replace('.', "::")
    }

    fn member_declaration(&self, member: &DeclaredMember, platform: &Platform) -> String {
        match member.ty {
            MemberType::Padding(len) => format!("uint8_t {}[{len}];", member.name),
            ty => format!("{} {};", self.type_name(ty, platform), member.name),
        }
    }

    fn struct_fragment<'a>(&self, model: &'a StructModel, platform: &Platform) -> Fragment<'a> {
        let members = member_lines(self, model, platform);
        let has_members = !members.is_empty();

        // Offsets are asserted only for named fields; padding is implied.
        let offset_checks: Vec<Fragment<'a>> = model
            .fields()
            .map(|field| {
                Fragment::seq([
                    Fragment::markup("offset_check", "static_assert(offsetof({{ struct_name }}, "),
                    Fragment::literal(format!(
                        "{}) == {}, \"{}\");\n",
                        field.name,
                        field.offset,
                        field.name
                    )),
                ])
            })
            .collect();

        Fragment::seq([
            Fragment::when(
                model.is_empty(),
                Fragment::line("// No fields; an empty struct occupies one byte."),
            ),
            Fragment::markup("struct_header", "struct {{ struct_name }}\n"),
            Fragment::line("{"),
            Fragment::indented(
                1,
                Fragment::seq([
                    Fragment::markup(
                        "size_constant",
                        "static constexpr uint32_t ByteSize = {{ byte_size }};\n",
                    ),
                    Fragment::when(
                        has_members,
                        Fragment::seq([Fragment::line(""), Fragment::seq(members)]),
                    ),
                ]),
            ),
            Fragment::line("};"),
            Fragment::markup(
                "size_assertion",
                "static_assert(sizeof({{ struct_name }}) == {{ byte_size }}, \
                 \"{{ struct_name }} ({{ variant }}) must be {{ byte_size }} bytes\");\n",
            ),
            Fragment::seq(offset_checks),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_width_follows_platform() {
        let member = DeclaredMember {
            name: "Target".to_string(),
            ty: MemberType::Handle,
            offset: 0,
        };
        assert_eq!(
            Managed.member_declaration(&member, &Platform::X64),
            "[FieldOffset(0)] public ulong Target;"
        );
        assert_eq!(Native.member_declaration(&member, &Platform::X86), "uint32_t Target;");
    }

    #[test]
    fn test_padding_declarations() {
        let member = DeclaredMember {
            name: "__pad0".to_string(),
            ty: MemberType::Padding(3),
            offset: 5,
        };
        let platform = Platform::default();
        assert_eq!(
            Managed.member_declaration(&member, &platform),
            "[FieldOffset(5)] private fixed byte __pad0[3];"
        );
        assert_eq!(Native.member_declaration(&member, &platform), "uint8_t __pad0[3];");
    }

    #[test]
    fn test_value_types_have_matching_widths() {
        // Same width on both sides for every scalar.
        let widths = |name: &str| match name {
            "bool" | "byte" | "sbyte" | "uint8_t" | "int8_t" => 1,
            "ushort" | "short" | "uint16_t" | "int16_t" => 2,
            "uint" | "int" | "float" | "uint32_t" | "int32_t" => 4,
            _ => 8,
        };
        for ty in [
            ValueType::Bool,
            ValueType::U8,
            ValueType::I8,
            ValueType::U16,
            ValueType::I16,
            ValueType::U32,
            ValueType::I32,
            ValueType::F32,
            ValueType::U64,
            ValueType::I64,
            ValueType::F64,
        ] {
            let managed = widths(Managed.value_type_name(ty));
            assert_eq!(managed, widths(Native.value_type_name(ty)), "{ty:?}");
            assert_eq!(managed, ty.size(), "{ty:?}");
        }
    }

    #[test]
    fn test_namespace_spelling() {
        assert_eq!(Managed.namespace("Engine.Commands"), "Engine.Commands");
        assert_eq!(Native.namespace("Engine.Commands"), "Engine::Commands");
    }
}
