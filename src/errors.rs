use thiserror::Error;

/// Main error type for the tailwind-class-validator crate
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Failed to parse stylesheet {path}: {message}")]
    StylesheetError { path: String, message: String },

    #[error("Catalogue error: {message}")]
    CatalogueError { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
