//! Compiler option values
//!
//! `CompileOptions` is an immutable configuration value handed through to
//! the compiler-services backend unchanged. The service itself only ever
//! reads `no_emit_on_error` indirectly, through the backend's emit result.

use serde::{Deserialize, Serialize};

/// Output language level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScriptTarget {
    Es3,
    #[default]
    Es5,
    Es2015,
    Es2017,
    EsNext,
}

/// Output module format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    None,
    #[default]
    CommonJs,
    Amd,
    Umd,
    System,
    Es2015,
}

/// Options for a single compile or transpile pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CompileOptions {
    /// Abort writing output if any diagnostic exists
    pub no_emit_on_error: bool,

    /// Flag implicitly-any typed expressions
    pub no_implicit_any: bool,

    /// Output language level
    pub target: ScriptTarget,

    /// Output module format
    pub module: ModuleKind,

    /// Suppress default ambient declarations; the registry supplies them
    pub no_lib: bool,
}
