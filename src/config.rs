//! Configuration management for the schema builder
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-builder.toml)
//! - Environment variables (SCHEMA_BUILDER__*)
//!
//! ## Example config file (schema-builder.toml):
//! ```toml
//! [validation]
//! check_formats = true
//!
//! [inference]
//! integers = false
//! detect_formats = true
//!
//! [messages]
//! locale = "de"
//!
//! [messages.overrides]
//! lengthRange = "Min length is larger than max length"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::messages::{Locale, MessageCatalog};

/// Main configuration for the schema builder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Instance validation settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Schema inference settings
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Message table settings
    #[serde(default)]
    pub messages: MessagesConfig,
}

/// Instance validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Check `uuid`/`tel` formats on top of the engine's built-in ones
    #[serde(default = "default_true")]
    pub check_formats: bool,
}

/// Inference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Report whole numbers as `integer` instead of `number`
    #[serde(default)]
    pub integers: bool,

    /// Attach a `format` when every sampled string has the same well-known one
    #[serde(default = "default_true")]
    pub detect_formats: bool,
}

/// Message table configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Built-in table to start from
    #[serde(default)]
    pub locale: Locale,

    /// Conflict token to replacement text
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_formats: true,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            integers: false,
            detect_formats: true,
        }
    }
}

impl MessagesConfig {
    pub fn catalog(&self) -> MessageCatalog {
        MessageCatalog::with_overrides(self.locale, &self.overrides)
    }
}

impl BuilderConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the default locations
    pub fn load_from(config_path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-builder.toml",
            ".schema-builder.toml",
            "config/schema-builder.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "schema-builder") {
            let xdg_config = config_dir.config_dir().join("schema-builder.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // SCHEMA_BUILDER__INFERENCE__INTEGERS=true
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_BUILDER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
