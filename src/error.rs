//! Error types for buildor
//!
//! Uses `thiserror` for library errors; the binary wraps them with `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildor operations
pub type BuildorResult<T> = Result<T, BuildorError>;

/// Main error type for buildor operations
#[derive(Error, Debug)]
pub enum BuildorError {
    /// IO error without file context
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file could not be read
    #[error("could not read {file}: {source}")]
    FileRead {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written back
    #[error("could not write {file}: {source}")]
    FileWrite {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scan root does not exist or is not a directory
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Configuration file failed to parse
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Two projects claim the same artifact under the `error` duplicate policy
    #[error("asset '{asset}' is produced by both {first} and {second}")]
    DuplicateAsset {
        asset: String,
        first: PathBuf,
        second: PathBuf,
    },
}
