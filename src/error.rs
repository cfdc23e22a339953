//! Error types for scriptc
//!
//! One `thiserror` enum for the whole service surface. Diagnostic batches
//! are the only caller-visible failure a healthy pipeline produces;
//! everything else is infrastructure.

use std::path::PathBuf;
use thiserror::Error;

use crate::backend::BackendError;

/// Result type alias for scriptc operations
pub type ScriptcResult<T> = Result<T, ScriptcError>;

/// Main error type for scriptc operations
#[derive(Error, Debug)]
pub enum ScriptcError {
    /// A compile or transpile batch produced diagnostics. The payload is
    /// the joined, human-readable report.
    #[error("script errors:\n{report}")]
    Diagnostics { report: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The compiler-services backend failed outside a diagnostics batch
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Invalid service configuration file
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// A directory scan was given a malformed glob pattern
    #[error("invalid scan pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}
