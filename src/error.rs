//! Error types for container decryption and dictionary loading.
//!
//! Neither type ever reaches the translate operations: the engine logs them and
//! falls back to pass-through. Messages never include key material or row text.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ContainerError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ContainerError {
    /// Too short, wrong magic tag, or a ciphertext length that is not a whole
    /// number of blocks.
    #[error("invalid container format: {context}")]
    InvalidFormat { context: &'static str },

    /// Wrong key, corrupted ciphertext, or bad padding.
    #[error("decryption failed: {context}")]
    DecryptFailed { context: &'static str },

    #[error("invalid key: {context}")]
    InvalidKey { context: &'static str },

    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ContainerError {
    pub fn invalid_format(context: &'static str) -> Self {
        Self::InvalidFormat { context }
    }

    pub fn decrypt_failed(context: &'static str) -> Self {
        Self::DecryptFailed { context }
    }

    pub fn invalid_key(context: &'static str) -> Self {
        Self::InvalidKey { context }
    }

    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("read dictionary {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("dictionary key: {0}")]
    Key(#[from] ContainerError),
}
