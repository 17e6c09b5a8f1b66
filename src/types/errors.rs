//! Error types used across homestead.
use thiserror::Error;

/// Failure categories for the filesystem mechanism layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Metadata check failed for a reason other than non-existence.
    #[error("lookup failed")]
    Lookup,
    /// Directory creation failed.
    #[error("create failed")]
    Create,
    /// chown failed.
    #[error("ownership change failed")]
    Ownership,
    /// chmod failed.
    #[error("mode change failed")]
    Mode,
    /// Source open or read failed.
    #[error("read failed")]
    Read,
    /// Destination open or write failed.
    #[error("write failed")]
    Write,
    /// Symlink read or creation failed.
    #[error("symlink operation failed")]
    Link,
}

/// Structured error with a kind and human message.
#[derive(Debug, Error)]
#[error("{kind}: {msg}")]
pub struct Error {
    pub kind: ErrorKind,
    pub msg: String,
}

impl Error {
    pub(crate) fn io(kind: ErrorKind, path: &std::path::Path, err: &std::io::Error) -> Self {
        Self {
            kind,
            msg: format!("{}: {err}", path.display()),
        }
    }
}

/// Convenient alias for results returning a `types::Error`.
pub type Result<T> = std::result::Result<T, Error>;
