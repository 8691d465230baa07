//! Error types for descriptor construction and settings loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A constructed descriptor broke one of its invariants.
    #[error("{platform} descriptor invariant violated: {message}")]
    Invariant { platform: String, message: String },

    #[error("failed to load settings from {}: {message}", path.display())]
    Settings { path: PathBuf, message: String },

    #[error("invalid settings value: {0}")]
    InvalidValue(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
