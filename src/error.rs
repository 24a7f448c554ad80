//! Error types for the schema builder
//!
//! The editing, checking and inference engines never fail; these errors only
//! come out of the parsing, configuration and file surfaces around them.

use thiserror::Error;

/// Result type for schema builder operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema builder errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}
