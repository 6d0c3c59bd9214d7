//! Source File Assembly
//!
//! Wraps the rendered structs of every record into one source file per
//! dialect. The file frame (banner, includes, namespace) lives in embedded
//! minijinja templates under `templates/`; the struct bodies are inserted as
//! pre-rendered text.
//!
//! The managed file also carries a module initializer that calls every
//! struct's `VerifyLayout`, so a size mismatch fails when the assembly loads.

use std::sync::OnceLock;

use cmdgen_core::{CodegenError, Result};
use cmdgen_template::whitespace;
use minijinja::{AutoEscape, Environment, Error, ErrorKind, UndefinedBehavior, syntax::SyntaxConfig};
use rust_embed::RustEmbed;
use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::dialect::TargetDialect;
use crate::record::RenderedStruct;

static FILE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "templates"]
struct FileTemplates;

/// Shared template environment, built on first use.
pub fn get_env() -> Result<&'static Environment<'static>> {
    if let Some(env) = FILE_ENV.get() {
        return Ok(env);
    }
    let env = build_env().map_err(template_error)?;
    Ok(FILE_ENV.get_or_init(|| env))
}

fn build_env() -> std::result::Result<Environment<'static>, Error> {
    let mut env = Environment::new();

    let syntax = SyntaxConfig::builder()
        .block_delimiters("{$", "$}")
        .variable_delimiters("{{", "}}")
        .line_statement_prefix("$$")
        .build()?;

    env.set_syntax(syntax);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_loader(template_loader);

    Ok(env)
}

fn template_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let Some(file) = FileTemplates::get(name) else {
        return Ok(None);
    };
    match std::str::from_utf8(file.data.as_ref()) {
        Ok(source) => Ok(Some(source.to_string())),
        Err(e) => Err(Error::new(
            ErrorKind::TemplateNotFound,
            format!("Template {name} is not valid UTF-8: {e}"),
        )),
    }
}

fn template_error(err: Error) -> CodegenError {
    CodegenError::FileTemplate(err.to_string())
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the output directory.
    pub name: String,
    pub contents: String,
}

impl GeneratedFile {
    /// Stable hash of the contents, for skipping unchanged writes.
    #[inline]
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        xxh3_64(self.contents.as_bytes())
    }
}

#[derive(Serialize)]
struct FileContext<'a> {
    namespace: String,
    record_count: usize,
    structs: Vec<&'a str>,
    struct_names: Vec<&'a str>,
    /// Class holding the managed module initializer.
    verifier: String,
}

/// Name of the class that runs every layout check of the file. The `__`
/// prefix is rejected in record names, so it cannot clash with a struct.
fn verifier_name(stem: &str) -> String {
    format!("__{}Layout", stem.replace('-', "_"))
}

/// Assembles `<stem>.g.<ext>` for `dialect` from already rendered structs.
pub fn assemble<'a>(
    dialect: &dyn TargetDialect,
    namespace: &str,
    stem: &str,
    record_count: usize,
    structs: impl IntoIterator<Item = &'a RenderedStruct>,
) -> Result<GeneratedFile> {
    let structs: Vec<&RenderedStruct> = structs.into_iter().collect();
    let ctx = FileContext {
        namespace: dialect.namespace(namespace),
        record_count,
        structs: structs.iter().map(|s| s.text.as_str()).collect(),
        struct_names: structs.iter().map(|s| s.struct_name.as_str()).collect(),
        verifier: verifier_name(stem),
    };

    let template = get_env()?
        .get_template(dialect.file_template())
        .map_err(template_error)?;
    let rendered = template.render(&ctx).map_err(template_error)?;

    let name = format!("{stem}.g.{}", dialect.file_extension());
    log::debug!("Assembled {name}: {} structs", ctx.structs.len());
    Ok(GeneratedFile {
        name,
        contents: whitespace::normalize(&rendered),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Managed, Native};

    fn rendered(name: &str, text: &str) -> RenderedStruct {
        RenderedStruct {
            dialect: "test",
            struct_name: name.to_string(),
            text: text.to_string(),
            members: Vec::new(),
        }
    }

    #[test]
    fn test_templates_are_embedded() {
        assert!(FileTemplates::get(Managed.file_template()).is_some());
        assert!(FileTemplates::get(Native.file_template()).is_some());
    }

    #[test]
    fn test_managed_file_frame() {
        let structs = [rendered("A", "struct A {}\n"), rendered("B", "struct B {}\n")];
        let file = assemble(&Managed, "Engine.Commands", "Commands", 1, &structs).unwrap();

        assert_eq!(file.name, "Commands.g.cs");
        assert!(file.contents.contains("namespace Engine.Commands;\n"));
        assert!(file.contents.contains("using System;\n"));
        assert!(file.contents.contains("using System.Runtime.InteropServices;\n"));
        let a = file.contents.find("struct A {}").unwrap();
        let b = file.contents.find("struct B {}").unwrap();
        assert!(a < b);
        assert!(file.contents.ends_with("    }\n}\n"));
    }

    #[test]
    fn test_managed_module_initializer() {
        let structs = [rendered("A", "struct A {}\n"), rendered("B", "struct B {}\n")];
        let file = assemble(&Managed, "Engine", "Render-Commands", 1, &structs).unwrap();

        let init = file.contents.find("internal static class __Render_CommandsLayout\n").unwrap();
        let tail = &file.contents[init..];
        assert!(tail.contains("    [ModuleInitializer]\n    internal static void Verify()\n"));
        assert!(tail.contains("        A.VerifyLayout();\n        B.VerifyLayout();\n"));
        assert!(file.contents.find("struct B {}").unwrap() < init);
    }

    #[test]
    fn test_native_file_frame() {
        let structs = [rendered("A", "struct A {};\n")];
        let file = assemble(&Native, "Engine.Commands", "Commands", 1, &structs).unwrap();

        assert_eq!(file.name, "Commands.g.hpp");
        assert!(file.contents.contains("#pragma once\n"));
        assert!(file.contents.contains("#include <cstddef>\n"));
        assert!(file.contents.contains("namespace Engine::Commands\n{\n"));
        assert!(file.contents.ends_with("} // namespace Engine::Commands\n"));
        assert!(!file.contents.contains("VerifyLayout"));
    }

    #[test]
    fn test_hash_tracks_contents() {
        let a = assemble(&Native, "N", "S", 1, &[rendered("A", "struct A {};\n")]).unwrap();
        let b = assemble(&Native, "N", "S", 1, &[rendered("A", "struct A {};\n")]).unwrap();
        let c = assemble(&Native, "N", "S", 1, &[rendered("C", "struct C {};\n")]).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
    }
}
