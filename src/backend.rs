//! Compiler-services backend interface
//!
//! The backend is an external collaborator: a long-lived, stateful
//! language service that polls the host for registered paths, version
//! tokens, and content snapshots, plus a stateless one-shot transpiler.
//! This module defines the contract; implementations live with the
//! embedding (and, for tests, in `testing`).

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::options::CompileOptions;
use crate::registry::ScriptSnapshot;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Failure reported by the backend outside a diagnostics batch
#[derive(Debug, Clone, Error)]
#[error("backend failure: {message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Zero-based position within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// A compiler-reported issue, optionally tied to a file and position.
///
/// Diagnostics are produced only by the backend; the service aggregates
/// and renders them but never fabricates its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: Option<PathBuf>,
    pub position: Option<Position>,
    pub message: String,
}

impl Diagnostic {
    /// A diagnostic not tied to any file (compiler-option level)
    pub fn global(message: impl Into<String>) -> Self {
        Self {
            file: None,
            position: None,
            message: message.into(),
        }
    }

    /// A diagnostic at a zero-based (line, character) position
    pub fn at(
        file: impl Into<PathBuf>,
        line: u32,
        character: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: Some(file.into()),
            position: Some(Position { line, character }),
            message: message.into(),
        }
    }
}

/// One emitted artifact: output path plus text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub name: PathBuf,
    pub text: String,
}

/// Result of asking the backend to emit one path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOutput {
    /// True when emission was refused (diagnostics should be collected)
    pub emit_skipped: bool,
    /// Artifacts to persist, possibly empty
    pub output_files: Vec<OutputArtifact>,
}

/// Host contract the language service polls
///
/// Implemented by `host::RegistryHost` over the file registry. The
/// default-library resolver answers none; ambient declarations reach the
/// backend through the registered path list instead.
pub trait ScriptHost {
    /// Every path the backend should see, in registration order
    fn script_file_names(&self) -> Vec<PathBuf>;

    /// Change-detection token for a path, absent if untracked
    fn script_version(&self, path: &Path) -> Option<String>;

    /// Lazily materialized content snapshot, absent if the file is gone
    fn script_snapshot(&mut self, path: &Path) -> Option<ScriptSnapshot>;

    /// The project's working directory
    fn current_directory(&self) -> &Path;

    /// The active compile options
    fn compilation_settings(&self) -> &CompileOptions;

    /// Default ambient-declaration file, always `None` here
    fn default_library(&self) -> Option<PathBuf>;
}

/// Stateful language service, constructed once and reused across saves
pub trait LanguageService {
    /// Request emission output for one path
    fn emit_output(&mut self, host: &mut dyn ScriptHost, path: &Path) -> BackendResult<EmitOutput>;

    /// Global compiler-option diagnostics
    fn options_diagnostics(&mut self, host: &mut dyn ScriptHost) -> BackendResult<Vec<Diagnostic>>;

    /// Syntactic diagnostics for one path
    fn syntactic_diagnostics(
        &mut self,
        host: &mut dyn ScriptHost,
        path: &Path,
    ) -> BackendResult<Vec<Diagnostic>>;

    /// Semantic diagnostics for one path
    fn semantic_diagnostics(
        &mut self,
        host: &mut dyn ScriptHost,
        path: &Path,
    ) -> BackendResult<Vec<Diagnostic>>;
}

/// Factory for language services, plus the stateless fast path
pub trait CompilerBackend {
    /// Construct a fresh language service bound to nothing yet; the host
    /// is supplied per call.
    fn create_service(&self) -> Box<dyn LanguageService>;

    /// One-shot syntax-only transform of `source`, independent of any
    /// language service state.
    fn transpile(
        &self,
        source: &str,
        options: &CompileOptions,
        path: &Path,
    ) -> (String, Vec<Diagnostic>);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_constructors() {
        let global = Diagnostic::global("bad option");
        assert!(global.file.is_none());
        assert!(global.position.is_none());

        let at = Diagnostic::at("a.ts", 2, 5, "unexpected token");
        assert_eq!(at.file.as_deref(), Some(Path::new("a.ts")));
        assert_eq!(at.position, Some(Position { line: 2, character: 5 }));
    }

    #[test]
    fn backend_error_display() {
        let err = BackendError::new("service hiccup");
        assert_eq!(err.to_string(), "backend failure: service hiccup");
    }
}
