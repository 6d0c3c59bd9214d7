//! Generator Configuration
//!
//! Everything a build step decides about one generation run: where the
//! generated types live, what the output files are called, and which
//! platform layout rules apply.
//!
//! ```rust,ignore
//! use cmdgen::GeneratorConfig;
//!
//! // Defaults: `Scene.Commands` namespace, `SceneCommands` files, 64-bit rules
//! let config = GeneratorConfig::default();
//!
//! // From a build script's JSON; missing keys keep their defaults
//! let config = GeneratorConfig::from_json(r#"{ "namespace": "Game.Render" }"#)?;
//! ```

use cmdgen_core::descriptor::validate_identifier;
use cmdgen_core::{CodegenError, Platform, Result};
use serde::{Deserialize, Serialize};

/// Settings for one [`CommandGenerator`](crate::CommandGenerator) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Dotted namespace of the generated types (`::`-separated on the native side).
    pub namespace: String,
    /// Output file stem; files are named `<stem>.g.cs` and `<stem>.g.hpp`.
    pub file_stem: String,
    pub platform: Platform,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: "Scene.Commands".to_string(),
            file_stem: "SceneCommands".to_string(),
            platform: Platform::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_file_stem(mut self, file_stem: impl Into<String>) -> Self {
        self.file_stem = file_stem.into();
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Checks the platform rules, every namespace segment and the file stem.
    pub fn validate(&self) -> Result<()> {
        self.platform.validate()?;

        if self.namespace.is_empty() {
            return Err(CodegenError::InvalidIdentifier {
                name: String::new(),
                reason: "namespace must not be empty",
            });
        }
        for segment in self.namespace.split('.') {
            validate_identifier(segment)?;
        }

        if self.file_stem.is_empty()
            || !self
                .file_stem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        {
            return Err(CodegenError::InvalidIdentifier {
                name: self.file_stem.clone(),
                reason: "file stem may only contain ASCII letters, digits, '_' and '-'",
            });
        }
        Ok(())
    }
}
