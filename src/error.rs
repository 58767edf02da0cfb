//! Error types for FileVault.

use thiserror::Error;

use crate::client::ApiError;

/// Common error type for FileVault.
#[derive(Error, Debug)]
pub enum FileVaultError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Session file could not be encoded or decoded.
    #[error("session storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<serde_json::Error> for FileVaultError {
    fn from(e: serde_json::Error) -> Self {
        FileVaultError::Storage(e.to_string())
    }
}

/// Result type alias for FileVault operations.
pub type Result<T> = std::result::Result<T, FileVaultError>;
