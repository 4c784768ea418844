//! Error types for modegroup-core

use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or reloading the mode config file
///
/// Any of these aborts the whole load; a store that already holds a table
/// keeps it.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Syntax error at line {line}, col {col}: {message}")]
    Syntax { line: u32, col: u32, message: String },

    #[error("Root section '{0}' not found")]
    MissingRoot(String),
}

/// Errors that stop a switch before anything is touched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwitchError {
    #[error("Mode group '{0}' not found")]
    ModeNotFound(String),
}

/// Errors reading or writing the engine settings file
#[derive(Error, Debug)]
pub enum EngineConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
