//! Error handling module for YtCut

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Startup and configuration errors
#[derive(Error, Debug)]
pub enum YtCutError {
    /// External executable could not be located
    #[error("Tool not found: {name}. Install it or set its path in the configuration")]
    ToolNotFound { name: String },

    /// Configuration value rejected by validation
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Domain error raised while wiring the application
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result type alias for YtCut operations
pub type YtCutResult<T> = std::result::Result<T, YtCutError>;
