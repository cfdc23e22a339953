//! Project layout and service configuration
//!
//! `ProjectLayout` locates the directories the registry scans; the two
//! ambient declaration files under the support directory are tracked by
//! every project. `ServiceConfig` is the persisted half: the save mode and
//! the output target/module pair, loaded from `scriptc.toml` at the
//! project root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ScriptcError, ScriptcResult};
use crate::options::{CompileOptions, ModuleKind, ScriptTarget};

/// File extension the service compiles
pub const SOURCE_EXTENSION: &str = "ts";

/// File extension of emitted output artifacts
pub const OUTPUT_EXTENSION: &str = "js";

/// Scan pattern for source files under the resource root
pub const SOURCE_PATTERN: &str = "*.ts";

/// Scan pattern for declaration files under the typings directory
pub const DECLARATION_PATTERN: &str = "*.d.ts";

/// Configuration file name, resolved against the project root
pub const CONFIG_FILE: &str = "scriptc.toml";

/// Ambient declaration files supplied to every compile
const AMBIENT_DECLARATIONS: [&str; 2] = ["lib.core.d.ts", "runtime.d.ts"];

/// Directory roots the service works against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root; also where `scriptc.toml` lives
    pub project_root: PathBuf,
    /// Root of the project's script sources
    pub resource_root: PathBuf,
    /// Directory holding project-supplied declaration files
    pub typings_dir: PathBuf,
    /// Tool support directory holding the ambient declarations
    pub support_dir: PathBuf,
}

impl ProjectLayout {
    /// Create a layout; the typings directory is `<project_root>/typings`.
    pub fn new(
        project_root: impl Into<PathBuf>,
        resource_root: impl Into<PathBuf>,
        support_dir: impl Into<PathBuf>,
    ) -> Self {
        let project_root = project_root.into();
        let typings_dir = project_root.join("typings");
        Self {
            project_root,
            resource_root: resource_root.into(),
            typings_dir,
            support_dir: support_dir.into(),
        }
    }

    /// The fixed ambient declaration paths, in tracking order
    pub fn ambient_declarations(&self) -> Vec<PathBuf> {
        AMBIENT_DECLARATIONS
            .iter()
            .map(|name| self.support_dir.join(name))
            .collect()
    }
}

/// True when the path carries the recognized source extension
pub fn is_source(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == SOURCE_EXTENSION)
        .unwrap_or(false)
}

/// Sibling output path for a source path (`foo.ts` -> `foo.js`)
pub fn output_path(path: &Path) -> PathBuf {
    path.with_extension(OUTPUT_EXTENSION)
}

/// Non-fatal warning collected while loading configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Unrecognized key, as written in the file
    pub key: String,
    /// File the key was found in
    pub file: PathBuf,
}

/// Persisted service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Perform a full type-checked compile on save, or just transpile
    pub full_compile: bool,

    /// Output language level for both save modes
    pub target: ScriptTarget,

    /// Output module format for both save modes
    pub module: ModuleKind,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            full_compile: true,
            target: ScriptTarget::Es5,
            module: ModuleKind::CommonJs,
        }
    }
}

impl ServiceConfig {
    /// Load configuration and collect non-fatal warnings (unknown keys).
    pub fn load(path: &Path) -> ScriptcResult<(Self, Vec<ConfigWarning>)> {
        let content = std::fs::read_to_string(path)?;

        let mut unknown: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);
        let config: Self = serde_ignored::deserialize(deserializer, |key| {
            unknown.push(key.to_string());
        })
        .map_err(|e| ScriptcError::InvalidConfig {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown
            .into_iter()
            .map(|key| ConfigWarning {
                key,
                file: path.to_path_buf(),
            })
            .collect();

        Ok((config, warnings))
    }

    /// Load `scriptc.toml` from the project root, or fall back to defaults.
    pub fn load_or_default(project_root: &Path) -> Self {
        let path = project_root.join(CONFIG_FILE);
        if path.exists() {
            match Self::load(&path) {
                Ok((config, warnings)) => {
                    for warning in &warnings {
                        log::warn!(
                            "unknown key '{}' in {}",
                            warning.key,
                            warning.file.display()
                        );
                    }
                    return config;
                }
                Err(err) => log::warn!("ignoring {}: {err}", path.display()),
            }
        }
        Self::default()
    }

    /// Option preset for the full type-checked compile mode
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            no_emit_on_error: true,
            no_implicit_any: false,
            target: self.target,
            module: self.module,
            no_lib: true,
        }
    }

    /// Option preset for the fast transpile mode
    pub fn transpile_options(&self) -> CompileOptions {
        CompileOptions {
            no_emit_on_error: false,
            ..self.compile_options()
        }
    }
}
