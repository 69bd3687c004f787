//! Common error types for VaultPack.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for VaultPack operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The host could not provide the memory the KDF requires.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The secret is wrong or the blob has been tampered with.
    ///
    /// Deliberately carries no detail: distinguishing a wrong password
    /// from a corrupted blob would hand an oracle to an attacker.
    #[error("Authentication failed: wrong password/keyfile or corrupted archive")]
    AuthenticationFailed,

    /// The sealed blob header could not be parsed.
    #[error("Malformed blob: {0}")]
    MalformedBlob(String),

    /// Packing encountered a symlink or special file.
    #[error("Unsupported entry type: {}", .path.display())]
    UnsupportedEntryType {
        /// Path of the offending filesystem entry.
        path: PathBuf,
    },

    /// An archive entry path would escape the destination root.
    #[error("Unsafe path in archive: {path}")]
    UnsafePath {
        /// The entry path as recorded in the archive.
        path: String,
    },

    /// I/O operation failed.
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        /// Path the failed operation was addressing.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an I/O error with the path the operation was addressing.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
