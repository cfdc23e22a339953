//! Script compilation service
//!
//! The lifecycle controller: translates save/delete/load/unload events
//! into registry and orchestrator calls, and keeps generated output
//! consistent with source removal. Owns its collaborators explicitly and
//! hands the registry to the orchestrator by reference.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::assets::AssetIndex;
use crate::backend::CompilerBackend;
use crate::config::{self, ProjectLayout, ServiceConfig};
use crate::error::ScriptcResult;
use crate::events::{ProjectHandler, ResourceHandler, ServiceRegistry};
use crate::fs::Storage;
use crate::orchestrator::CompileOrchestrator;
use crate::registry::FileRegistry;

/// Compiles or transpiles project scripts on save and reconciles their
/// generated output with deletes and project lifecycle changes.
pub struct ScriptService {
    config: ServiceConfig,
    layout: ProjectLayout,
    storage: Box<dyn Storage>,
    assets: Box<dyn AssetIndex>,
    registry: FileRegistry,
    orchestrator: CompileOrchestrator,
}

impl ScriptService {
    pub fn new(
        layout: ProjectLayout,
        config: ServiceConfig,
        storage: Box<dyn Storage>,
        backend: Box<dyn CompilerBackend>,
        assets: Box<dyn AssetIndex>,
    ) -> Self {
        Self {
            config,
            layout,
            storage,
            assets,
            registry: FileRegistry::new(),
            orchestrator: CompileOrchestrator::new(backend),
        }
    }

    /// One-time registration against both event families
    pub fn register(service: Rc<RefCell<ScriptService>>, services: &mut ServiceRegistry) {
        services.register_resource(service.clone());
        services.register_project(service);
    }

    /// The tracked-file registry, for observation
    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// The generated-asset index, for observation
    pub fn assets(&self) -> &dyn AssetIndex {
        self.assets.as_ref()
    }

    /// True once the compiler backend has been warmed up
    pub fn is_warm(&self) -> bool {
        self.orchestrator.is_warm()
    }

    fn reset(&mut self) {
        self.registry.reset();
        self.orchestrator.reset();
    }
}

impl ResourceHandler for ScriptService {
    fn can_handle(&self, path: &Path) -> bool {
        config::is_source(path)
    }

    fn can_handle_delete(&self, path: &Path) -> bool {
        config::is_source(path)
    }

    fn on_saved(&mut self, path: &Path) -> ScriptcResult<()> {
        log::info!("save received for {}", path.display());
        let paths = [path.to_path_buf()];
        if self.config.full_compile {
            self.orchestrator.compile(
                &mut self.registry,
                self.storage.as_ref(),
                &self.layout,
                &paths,
                &self.config.compile_options(),
            )
        } else {
            self.orchestrator.transpile(
                self.storage.as_ref(),
                &paths,
                &self.config.transpile_options(),
            )
        }
    }

    fn on_deleted(&mut self, path: &Path) -> ScriptcResult<()> {
        log::info!("delete received for {}", path.display());
        self.registry.remove(path);

        let output = config::output_path(path);
        if let Some(handle) = self.assets.lookup_by_path(&output) {
            log::info!("removing generated output {}", output.display());
            self.assets.delete(handle);
        }
        Ok(())
    }
}

impl ProjectHandler for ScriptService {
    fn on_project_loaded(&mut self, path: &Path) -> ScriptcResult<()> {
        log::info!("project loaded from {}", path.display());
        self.reset();
        // TODO: warm the compiler here so the first save after a load
        // skips the cold-start spike
        Ok(())
    }

    fn on_project_unloaded(&mut self) -> ScriptcResult<()> {
        log::info!("project unloaded");
        self.reset();
        Ok(())
    }
}
