//! Command Generator
//!
//! Batch driver for one run: validates the record set, compiles both
//! variants of every record, proves each layout against the sequential
//! packing model, renders both dialects and assembles the two source files.
//!
//! The run is all-or-nothing. The first error aborts it, wrapped with the
//! record (and variant) it came from; no partial output is returned.

use cmdgen_core::{RecordSet, Result, Variant};
use cmdgen_emit::{GeneratedFile, Managed, Native, RecordEmitter, RenderedRecord, assemble};
use cmdgen_layout::{LayoutCompiler, RecordLayouts, sequential};

use crate::config::GeneratorConfig;

/// Per-variant facts about one generated struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub struct_name: String,
    pub record: String,
    pub variant: Variant,
    pub total_size: u32,
    pub padding_bytes: u32,
    pub is_empty: bool,
}

impl From<&RenderedRecord> for RecordSummary {
    fn from(rendered: &RenderedRecord) -> Self {
        Self {
            struct_name: rendered.struct_name.clone(),
            record: rendered.record.clone(),
            variant: rendered.variant,
            total_size: rendered.total_size,
            padding_bytes: rendered.padding_bytes,
            is_empty: rendered.is_empty,
        }
    }
}

/// Output of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSources {
    /// Explicit-offset form (`<stem>.g.cs`).
    pub managed: GeneratedFile,
    /// Sequential form (`<stem>.g.hpp`).
    pub native: GeneratedFile,
    /// One entry per record and variant, in output order.
    pub records: Vec<RecordSummary>,
}

impl GeneratedSources {
    #[must_use]
    pub fn files(&self) -> [&GeneratedFile; 2] {
        [&self.managed, &self.native]
    }

    #[must_use]
    pub fn summary(&self, struct_name: &str) -> Option<&RecordSummary> {
        self.records.iter().find(|s| s.struct_name == struct_name)
    }
}

/// Generates both source files for a record set.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    config: GeneratorConfig,
    compiler: LayoutCompiler,
    emitter: RecordEmitter,
}

impl CommandGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            compiler: LayoutCompiler::new(config.platform),
            emitter: RecordEmitter::new(config.platform),
            config,
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Validates `records` and compiles both variants of each, checking
    /// every layout against sequential packing.
    pub fn compile(&self, records: &RecordSet) -> Result<Vec<RecordLayouts>> {
        let platform = self.config.platform;
        records.validate(&platform)?;

        records
            .iter()
            .map(|record| {
                let layouts = self.compiler.compile_record(record)?;
                for layout in layouts.iter() {
                    sequential::verify(layout, &platform)
                        .map_err(|e| e.in_variant(&record.name, layout.variant))?;
                }
                Ok(layouts)
            })
            .collect()
    }

    /// Runs the whole pipeline and returns both files.
    pub fn generate(&self, records: &RecordSet) -> Result<GeneratedSources> {
        log::info!(
            "Generating {} command records into {}",
            records.len(),
            self.config.file_stem
        );

        let layouts = self.compile(records)?;

        let mut rendered = Vec::with_capacity(layouts.len() * Variant::ALL.len());
        for record_layouts in &layouts {
            for layout in record_layouts.iter() {
                rendered.push(self.emitter.emit(layout)?);
            }
        }

        let namespace = &self.config.namespace;
        let stem = &self.config.file_stem;
        let managed = assemble(
            &Managed,
            namespace,
            stem,
            records.len(),
            rendered.iter().map(|r| &r.managed),
        )?;
        let native = assemble(
            &Native,
            namespace,
            stem,
            records.len(),
            rendered.iter().map(|r| &r.native),
        )?;

        let summaries: Vec<RecordSummary> = rendered.iter().map(RecordSummary::from).collect();
        for summary in &summaries {
            log::debug!(
                "{}: {} bytes, {} padding{}",
                summary.struct_name,
                summary.total_size,
                summary.padding_bytes,
                if summary.is_empty { " (empty)" } else { "" }
            );
        }
        log::info!(
            "Generated {} and {} ({} structs)",
            managed.name,
            native.name,
            summaries.len()
        );

        Ok(GeneratedSources {
            managed,
            native,
            records: summaries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdgen_core::{CodegenError, FieldDescriptor, RecordDescriptor, ValueType};

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig::default().with_namespace("");
        assert!(CommandGenerator::new(config).is_err());
    }

    #[test]
    fn test_summaries_cover_both_variants() {
        let set = RecordSet::new(vec![
            RecordDescriptor::new("A").with_field(FieldDescriptor::value("x", ValueType::U32)),
            RecordDescriptor::new("B"),
        ]);
        let sources = CommandGenerator::new(GeneratorConfig::default())
            .unwrap()
            .generate(&set)
            .unwrap();

        let names: Vec<_> = sources.records.iter().map(|s| s.struct_name.as_str()).collect();
        assert_eq!(names, ["A", "AAnimated", "B", "BAnimated"]);
        assert!(sources.summary("B").unwrap().is_empty);
        assert_eq!(sources.summary("A").unwrap().total_size, 4);
    }

    #[test]
    fn test_validation_runs_before_layout() {
        let set = RecordSet::new(vec![
            RecordDescriptor::new("A")
                .with_field(FieldDescriptor::value("x", ValueType::U32))
                .with_field(FieldDescriptor::value("x", ValueType::U8)),
        ]);
        let err = CommandGenerator::new(GeneratorConfig::default())
            .unwrap()
            .generate(&set)
            .unwrap_err();
        assert!(matches!(err.root_cause(), CodegenError::DuplicateField { .. }));
    }
}
