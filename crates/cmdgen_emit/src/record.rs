//! Record Emitter
//!
//! Renders one compiled layout in both dialects. Both renderings come from
//! the same [`StructModel`], and the producers behind `struct_name`,
//! `byte_size`, `record` and `variant` are registered once per record, so
//! the two texts always name the same struct and assert the same size.

use cmdgen_core::{CodegenError, Platform, Result, Variant};
use cmdgen_layout::CompiledLayout;
use cmdgen_template::TemplateEngine;

use crate::dialect::{Managed, Native, TargetDialect};
use crate::model::{DeclaredMember, StructModel};

/// One struct rendered in one dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStruct {
    /// Dialect label (`managed` or `native`).
    pub dialect: &'static str,
    pub struct_name: String,
    pub text: String,
    /// Members in declaration order. Offsets are only written to the text
    /// when the dialect uses explicit offsets.
    pub members: Vec<DeclaredMember>,
}

/// One record variant rendered in both dialects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRecord {
    pub struct_name: String,
    pub record: String,
    pub variant: Variant,
    pub total_size: u32,
    pub padding_bytes: u32,
    pub is_empty: bool,
    pub managed: RenderedStruct,
    pub native: RenderedStruct,
}

/// Renders compiled layouts for one platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordEmitter {
    platform: Platform,
}

impl RecordEmitter {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Renders `layout` in both dialects.
    ///
    /// Template failures are reported with the record and variant attached.
    pub fn emit(&self, layout: &CompiledLayout) -> Result<RenderedRecord> {
        let model = StructModel::from_layout(layout);
        let managed = self
            .render(&Managed, &model)
            .map_err(|e| e.in_variant(&model.record, model.variant))?;
        let native = self
            .render(&Native, &model)
            .map_err(|e| e.in_variant(&model.record, model.variant))?;

        Ok(RenderedRecord {
            struct_name: model.name.clone(),
            record: model.record.clone(),
            variant: model.variant,
            total_size: model.total_size,
            padding_bytes: layout.padding_bytes(),
            is_empty: model.is_empty(),
            managed,
            native,
        })
    }

    /// Renders `model` in a single dialect.
    pub fn render(&self, dialect: &dyn TargetDialect, model: &StructModel) -> Result<RenderedStruct> {
        let engine = Self::engine(model);
        let fragment = dialect.struct_fragment(model, &self.platform);
        let text = engine.render(&fragment).map_err(CodegenError::from)?;

        log::trace!("Rendered {} ({})", model.name, dialect.name());
        Ok(RenderedStruct {
            dialect: dialect.name(),
            struct_name: model.name.clone(),
            text,
            members: model.members.clone(),
        })
    }

    fn engine(model: &StructModel) -> TemplateEngine<'static> {
        TemplateEngine::new()
            .with_value("struct_name", model.name.clone())
            .with_value("byte_size", model.total_size)
            .with_value("record", model.record.clone())
            .with_value("variant", model.variant)
    }
}
