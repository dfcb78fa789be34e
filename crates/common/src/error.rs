//! Error types for Shopcheck

use thiserror::Error;

/// Result type alias using the Shopcheck error
pub type Result<T> = std::result::Result<T, Error>;

/// Shopcheck error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("Environment '{name}' not found. Available environments: {}", available.join(", "))]
    UnknownEnvironment { name: String, available: Vec<String> },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown preset '{preset}' for {kind}")]
    UnknownPreset { kind: String, preset: String },

    #[error("Logging already initialised: {0}")]
    Logging(String),
}
