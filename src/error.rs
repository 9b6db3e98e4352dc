//! Error types for corpus-lm.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LmError {
    // Input validation errors
    #[error("Could not find the input path {}", path.display())]
    InputNotFound { path: PathBuf },

    // Per-unit extraction errors (recorded by the aggregator, never fatal)
    #[error("Could not decode {} as UTF-8", path.display())]
    Decode { path: PathBuf },

    #[error("Could not read annotation file {}: {diagnostic}", path.display())]
    StructuredParse { path: PathBuf, diagnostic: String },

    // Training pipeline errors
    #[error("There was an error in {tool} ({stage} stage): {diagnostic}")]
    Stage {
        stage: String,
        tool: String,
        diagnostic: String,
    },

    #[error("External tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Failed to launch {tool}: {message}")]
    ToolLaunch { tool: String, message: String },

    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, LmError>;
