//! Struct layout tests
//!
//! Tests for:
//! - Descending-size ordering and offset assignment
//! - Determinism of compiled layouts
//! - Alignment, contiguity and tail padding on randomized records
//! - Agreement with the sequential packing model
//! - Base/animated containment
//! - Empty records

use cmdgen::{FieldDescriptor, LayoutCompiler, Platform, RecordDescriptor, ValueType, Variant};
use cmdgen_layout::{CompiledLayout, EMPTY_RECORD_SIZE, sequential};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

// ============================================================================
// Helper
// ============================================================================

const VALUE_TYPES: [ValueType; 11] = [
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
];

fn random_record(rng: &mut StdRng, index: usize) -> RecordDescriptor {
    let mut record = RecordDescriptor::new(format!("Record{index}"));
    let field_count = rng.random_range(0..12);

    for i in 0..field_count {
        let field = match rng.random_range(0..10) {
            0 => FieldDescriptor::handle(format!("Handle{i}")),
            1 => FieldDescriptor::animation_handle(format!("Driver{i}")),
            _ => {
                let ty = VALUE_TYPES[rng.random_range(0..VALUE_TYPES.len())];
                let mut field = FieldDescriptor::value(format!("Field{i}"), ty);
                if rng.random_range(0..4) == 0 {
                    field = field.animatable();
                }
                field
            }
        };
        let field = if rng.random_range(0..5) == 0 {
            field.advanced()
        } else {
            field
        };
        record = record.with_field(field);
    }
    record
}

fn offsets(layout: &CompiledLayout) -> Vec<(&str, u32)> {
    layout
        .fields()
        .map(|(entry, field)| (field.name.as_str(), entry.offset))
        .collect()
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn eight_then_four_byte_fields() {
    let platform = Platform {
        max_alignment: 8,
        min_struct_alignment: 4,
        handle_size: 4,
    };
    let record = RecordDescriptor::new("Sample")
        .with_field(FieldDescriptor::value("First", ValueType::U32))
        .with_field(FieldDescriptor::value("Wide", ValueType::F64))
        .with_field(FieldDescriptor::handle("Second"));
    let layout = LayoutCompiler::new(platform)
        .compile(&record, Variant::Base)
        .unwrap();

    assert_eq!(offsets(&layout), [("Wide", 0), ("First", 8), ("Second", 12)]);
    assert_eq!(layout.total_size, 16);
    assert!(!layout.has_padding());
}

#[test]
fn equal_sizes_keep_declaration_order() {
    let record = RecordDescriptor::new("Ties")
        .with_field(FieldDescriptor::value("c", ValueType::I32))
        .with_field(FieldDescriptor::value("a", ValueType::F32))
        .with_field(FieldDescriptor::value("b", ValueType::U32));
    let layout = LayoutCompiler::default().compile(&record, Variant::Base).unwrap();
    assert_eq!(offsets(&layout), [("c", 0), ("a", 4), ("b", 8)]);
}

#[test]
fn tail_padding_reaches_struct_alignment() {
    let record = RecordDescriptor::new("Tail")
        .with_field(FieldDescriptor::value("Big", ValueType::U64))
        .with_field(FieldDescriptor::value("Small", ValueType::U8));
    let layout = LayoutCompiler::default().compile(&record, Variant::Base).unwrap();

    assert_eq!(layout.total_size, 16);
    assert_eq!(layout.padding_bytes(), 7);
    let last = layout.entries.last().unwrap();
    assert!(last.is_padding());
    assert_eq!(last.end(), 16);
}

#[test]
fn single_byte_record_rounds_to_minimum_alignment() {
    let record = RecordDescriptor::new("Flag").with_field(FieldDescriptor::value("On", ValueType::Bool));
    let layout = LayoutCompiler::default().compile(&record, Variant::Base).unwrap();
    assert_eq!(layout.total_size, 4);
    assert_eq!(layout.alignment, 4);
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn compilation_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let compiler = LayoutCompiler::default();

    for index in 0..50 {
        let record = random_record(&mut rng, index);
        let first = compiler.compile_record(&record).unwrap();
        let second = compiler.compile_record(&record.clone()).unwrap();
        assert_eq!(first, second);
    }
}

// ============================================================================
// Randomized invariants
// ============================================================================

#[test]
fn random_layouts_hold_invariants() {
    let mut rng = StdRng::seed_from_u64(42);

    for platform in [Platform::X64, Platform::X86] {
        let compiler = LayoutCompiler::new(platform);
        for index in 0..300 {
            let record = random_record(&mut rng, index);
            if record.validate(&platform).is_err() {
                continue;
            }

            for variant in Variant::ALL {
                let Ok(layout) = compiler.compile(&record, variant) else {
                    // Only 8-byte fields on the 32-bit platform may fail.
                    assert_eq!(platform, Platform::X86);
                    continue;
                };

                // Contiguous, gap-free entries.
                let mut cursor = 0;
                for entry in &layout.entries {
                    assert_eq!(entry.offset, cursor, "{} ({variant})", record.name);
                    cursor = entry.end();
                }

                if layout.is_empty() {
                    assert_eq!(layout.total_size, EMPTY_RECORD_SIZE);
                } else {
                    assert_eq!(cursor, layout.total_size);
                    assert_eq!(layout.total_size % layout.alignment, 0);
                    assert!(layout.alignment >= platform.min_struct_alignment);
                }

                for (entry, field) in layout.fields() {
                    assert_eq!(entry.offset % field.alignment(&platform), 0, "{}", field.name);
                }

                sequential::verify(&layout, &platform).unwrap();
            }
        }
    }
}

#[test]
fn random_layouts_match_sequential_packing() {
    let mut rng = StdRng::seed_from_u64(1234);
    let platform = Platform::default();
    let compiler = LayoutCompiler::new(platform);

    for index in 0..200 {
        let record = random_record(&mut rng, index);
        for variant in Variant::ALL {
            let layout = compiler.compile(&record, variant).unwrap();
            let packed = sequential::pack(&sequential::members_of(&layout, &platform));

            let explicit: Vec<u32> = layout.entries.iter().map(|e| e.offset).collect();
            assert_eq!(explicit, packed.offsets);
            assert_eq!(layout.total_size, packed.size);
        }
    }
}

// ============================================================================
// Variant containment
// ============================================================================

#[test]
fn animated_extends_base() {
    let mut rng = StdRng::seed_from_u64(99);
    let compiler = LayoutCompiler::default();

    for index in 0..200 {
        let record = random_record(&mut rng, index);
        let layouts = compiler.compile_record(&record).unwrap();

        for (entry, field) in layouts.base.fields() {
            let animated = layouts.animated.field(&field.name).unwrap();
            assert_eq!(animated.offset, entry.offset, "{}.{}", record.name, field.name);
        }
        assert!(layouts.animated.fields().count() >= layouts.base.fields().count());
        if !layouts.base.is_empty() {
            assert!(layouts.animated.total_size >= layouts.base.total_size);
        }
    }
}

#[test]
fn animation_slot_follows_base_group() {
    let record = RecordDescriptor::new("SetOpacity")
        .with_field(FieldDescriptor::handle("Target"))
        .with_field(FieldDescriptor::value("Opacity", ValueType::F32).animatable());
    let layouts = LayoutCompiler::default().compile_record(&record).unwrap();

    assert_eq!(offsets(&layouts.base), [("Target", 0), ("Opacity", 8)]);
    assert_eq!(layouts.base.total_size, 16);
    assert_eq!(
        offsets(&layouts.animated),
        [("Target", 0), ("Opacity", 8), ("OpacityAnimation", 16)]
    );
    assert_eq!(layouts.animated.total_size, 24);
    assert_eq!(layouts.animated.struct_name(), "SetOpacityAnimated");
}

// ============================================================================
// Empty records
// ============================================================================

#[test]
fn empty_record_is_one_byte_in_both_variants() {
    let layouts = LayoutCompiler::default()
        .compile_record(&RecordDescriptor::new("Nop"))
        .unwrap();
    for layout in layouts.iter() {
        assert!(layout.entries.is_empty());
        assert_eq!(layout.total_size, 1);
        assert_eq!(sequential::pack(&[]).size, layout.total_size);
    }
}
