use std::path::PathBuf;

use crate::syntax::SyntaxError;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("router file {path} could not be read: {source}")]
    RouterUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("type source {path} could not be loaded: {message}")]
    TypeSourceUnreadable { path: PathBuf, message: String },

    #[error("failed to parse {file}: {source}")]
    HandlerFileParse {
        file: PathBuf,
        #[source]
        source: SyntaxError,
    },

    #[error("failed to rewrite {file}: {message}")]
    SpliceIo { file: PathBuf, message: String },

    #[error("handler directory does not exist: {0}")]
    HandlerDirMissing(PathBuf),

    #[error("no handler files matching '{pattern}' found under {dir}")]
    NoHandlersFound { dir: PathBuf, pattern: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn splice(file: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Error::SpliceIo {
            file: file.into(),
            message: message.to_string(),
        }
    }
}
