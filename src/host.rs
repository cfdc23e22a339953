//! Registry-backed host adapter
//!
//! The language service knows nothing about `FileRegistry`; it polls the
//! `ScriptHost` contract. `RegistryHost` is the adapter answering that
//! contract from the registry, the storage layer, and the active options.

use std::path::{Path, PathBuf};

use crate::backend::ScriptHost;
use crate::config::ProjectLayout;
use crate::fs::Storage;
use crate::options::CompileOptions;
use crate::registry::{FileRegistry, ScriptSnapshot};

/// `ScriptHost` implementation over a `FileRegistry`
pub struct RegistryHost<'a> {
    registry: &'a mut FileRegistry,
    storage: &'a dyn Storage,
    layout: &'a ProjectLayout,
    options: &'a CompileOptions,
}

impl<'a> RegistryHost<'a> {
    pub fn new(
        registry: &'a mut FileRegistry,
        storage: &'a dyn Storage,
        layout: &'a ProjectLayout,
        options: &'a CompileOptions,
    ) -> Self {
        Self {
            registry,
            storage,
            layout,
            options,
        }
    }
}

impl ScriptHost for RegistryHost<'_> {
    fn script_file_names(&self) -> Vec<PathBuf> {
        self.registry.files().to_vec()
    }

    fn script_version(&self, path: &Path) -> Option<String> {
        self.registry.version_of(path)
    }

    fn script_snapshot(&mut self, path: &Path) -> Option<ScriptSnapshot> {
        self.registry.snapshot_of(self.storage, path)
    }

    fn current_directory(&self) -> &Path {
        &self.layout.resource_root
    }

    fn compilation_settings(&self) -> &CompileOptions {
        self.options
    }

    // Ambient declarations are tracked in the registry, so the backend
    // never loads a default library of its own.
    fn default_library(&self) -> Option<PathBuf> {
        None
    }
}
