//! Configuration files.
//!
//! All settings have built-in defaults; a TOML file only needs to contain the
//! values it overrides. Zone tables are external data keyed by model id:
//!
//! ```toml
//! default_model = "hatchback"
//!
//! [bake]
//! resolution = 2048
//!
//! [[models]]
//! id = "hatchback"
//!
//! [[models.zones]]
//! id = "zone-hood"
//! name = "Hood"
//! x = 0.2
//! y = 0.05
//! width = 0.6
//! height = 0.25
//! color = "#ff6b6b"
//! ```
//!
//! When a file lists no models the built-in `generic-sedan` table is used.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bake::BakeOptions;
use crate::editor::EditorOptions;
use crate::error::{LiveryError, Result};
use crate::uv::UvOptions;
use crate::zone::{ModelZones, ZoneRegistry, DEFAULT_MODEL_ID};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Model selected at startup.
    pub default_model: String,
    /// UV image extraction.
    pub uv: UvOptions,
    /// Baking.
    pub bake: BakeOptions,
    /// Placement editor.
    pub editor: EditorOptions,
    /// Zone tables; empty means the built-in table.
    pub models: Vec<ModelZones>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL_ID.to_string(),
            uv: UvOptions::default(),
            bake: BakeOptions::default(),
            editor: EditorOptions::default(),
            models: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| LiveryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|e| match e {
            LiveryError::Config(msg) => LiveryError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LiveryError::Config(e.to_string()))
    }

    /// Check numeric ranges and that the default model has zones.
    pub fn validate(&self) -> Result<()> {
        self.bake.validate()?;
        if self.uv.size == 0 {
            return Err(LiveryError::invalid_param("uv.size", self.uv.size, "must be positive"));
        }
        if self.editor.canvas_size == 0 {
            return Err(LiveryError::invalid_param(
                "editor.canvas_size",
                self.editor.canvas_size,
                "must be positive",
            ));
        }
        let registry = self.registry()?;
        if !registry.contains_model(&self.default_model) {
            return Err(LiveryError::UnknownModel(self.default_model.clone()));
        }
        Ok(())
    }

    /// Build the zone registry described by this configuration.
    pub fn registry(&self) -> Result<ZoneRegistry> {
        if self.models.is_empty() {
            Ok(ZoneRegistry::builtin())
        } else {
            ZoneRegistry::from_models(self.models.clone())
        }
    }
}
