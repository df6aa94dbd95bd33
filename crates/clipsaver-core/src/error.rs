//! Centralized error types for ClipSaver.

use thiserror::Error;

/// Main error type for ClipSaver operations.
#[derive(Error, Debug)]
pub enum SaverError {
    #[error("Storage error: {0}")]
    Store(#[from] clipsaver_store::StoreError),

    #[error("Media error: {0}")]
    Media(#[from] clipsaver_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type for ClipSaver operations.
pub type SaverResult<T> = Result<T, SaverError>;

impl SaverError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
