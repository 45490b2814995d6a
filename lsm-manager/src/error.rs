//! The closed error taxonomy of spec §7, realized as a type rather than a
//! convention: one variant per kind, so exhaustive matches and the property
//! tests in §8 stay mechanically checkable.

use thiserror::Error;

/// Errors produced by the policy synthesis and lifecycle engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} is already set")]
    Conflict(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("mutation forbidden: secure application has a sticky error flag set")]
    Forbidden,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: camino::Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template error: {0}")]
    Template(String),

    #[error("policy compiler failed: {0}")]
    Compile(String),

    #[error("policy store error: {0}")]
    PolicyStore(String),

    #[error("{what} exceeds the maximum length of {max}")]
    NameTooLong { what: String, max: usize },
}

/// Crate-local `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<camino::Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
