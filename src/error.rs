//! Error types for vault access.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Errors that can occur while reading, writing or browsing a vault
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("path is outside the vault: {}", .0.display())]
    OutsideVault(PathBuf),

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The note changed on disk after it was read for editing
    #[error("note changed since it was opened: {}", .0.display())]
    StaleNote(PathBuf),
}

impl VaultError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            VaultError::NotFound(path)
        } else {
            VaultError::Io { path, source }
        }
    }
}
