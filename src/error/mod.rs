mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_with_color};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NopackageError {
    #[error("Cannot read a program name from '{source_name}': {reason}")]
    NameParse { source_name: String, reason: String },

    #[error("No version was found in '{source_name}'")]
    VersionNotFound {
        source_name: String,
        tokens: Vec<String>,
    },

    #[error("The program id was used before it was finalized: {0}")]
    LuidNotFinalized(String),

    #[error("Program '{0}' is not installed")]
    ProgramNotFound(String),

    #[error("Could not detect the program binary in {dir}")]
    BinaryNotFound {
        dir: String,
        candidates: Vec<String>,
    },

    #[error("Failed to extract archive: {0}")]
    Extract(String),

    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Shortcut error: {0}")]
    Shortcut(String),

    #[error("Configuration file error: {0}")]
    ConfigFile(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Security error: {0}")]
    SecurityError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, NopackageError>;
