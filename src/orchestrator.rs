//! Compile orchestration
//!
//! Two strategies over the same storage: the full, type-checked compile
//! that drives the stateful language service through the registry cache,
//! and the stateless transpile fast path that trades checking for speed.
//! Diagnostics from a batch are aggregated and escalated as one error.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::backend::{CompilerBackend, Diagnostic, LanguageService};
use crate::config::{self, ProjectLayout};
use crate::error::{ScriptcError, ScriptcResult};
use crate::fs::Storage;
use crate::host::RegistryHost;
use crate::options::CompileOptions;
use crate::registry::FileRegistry;
use crate::reporter;

/// Drives full compiles and transpiles against a compiler backend.
///
/// The language service is constructed lazily on the first full compile
/// and reused until `reset`; constructing it compiles every registered
/// path, so the first call carries a cost proportional to project size.
pub struct CompileOrchestrator {
    backend: Box<dyn CompilerBackend>,
    service: Option<Box<dyn LanguageService>>,
}

impl CompileOrchestrator {
    pub fn new(backend: Box<dyn CompilerBackend>) -> Self {
        Self {
            backend,
            service: None,
        }
    }

    /// True once the language service has been constructed
    pub fn is_warm(&self) -> bool {
        self.service.is_some()
    }

    /// Discard the language service; the next compile is a cold start.
    pub fn reset(&mut self) {
        self.service = None;
    }

    /// Full compile with type checking.
    ///
    /// Refreshes the registry with `paths`, then either cold-starts the
    /// language service and compiles every registered path, or bumps and
    /// recompiles just the paths given. Diagnostics are concatenated in
    /// processing order and escalated as one error; artifacts written for
    /// files that compiled cleanly before the escalation stay on disk.
    ///
    /// Batches are best-effort: a path whose emit fails outright is
    /// logged and contributes no diagnostics, and the rest of the batch
    /// still runs.
    pub fn compile(
        &mut self,
        registry: &mut FileRegistry,
        storage: &dyn Storage,
        layout: &ProjectLayout,
        paths: &[PathBuf],
        options: &CompileOptions,
    ) -> ScriptcResult<()> {
        let started = Instant::now();
        registry.refresh(storage, layout, paths)?;

        let mut diagnostics = Vec::new();
        match self.service.as_mut() {
            None => {
                let mut service = self.backend.create_service();
                for path in registry.files().to_vec() {
                    diagnostics.extend(compile_file(
                        service.as_mut(),
                        registry,
                        storage,
                        layout,
                        options,
                        &path,
                    ));
                }
                self.service = Some(service);
            }
            Some(service) => {
                for path in paths {
                    registry.bump_version(path);
                    diagnostics.extend(compile_file(
                        service.as_mut(),
                        registry,
                        storage,
                        layout,
                        options,
                        path,
                    ));
                }
            }
        }

        if !diagnostics.is_empty() {
            return Err(reporter::escalate(&diagnostics));
        }
        log::info!(
            "compile finished in {} ms",
            started.elapsed().as_millis()
        );
        Ok(())
    }

    /// Request emission output for one path through the warm service.
    ///
    /// On a skipped emit, diagnostics are collected from the three fixed
    /// sources in order (options, syntactic, semantic) and nothing is
    /// written; otherwise every output artifact is written, overwriting
    /// what was there.
    pub fn emit_file(
        &mut self,
        registry: &mut FileRegistry,
        storage: &dyn Storage,
        layout: &ProjectLayout,
        options: &CompileOptions,
        path: &Path,
    ) -> ScriptcResult<Vec<Diagnostic>> {
        let service = self.service.as_mut().ok_or_else(|| {
            ScriptcError::Backend(crate::backend::BackendError::new(
                "language service not constructed; run a full compile first",
            ))
        })?;
        emit_file(service.as_mut(), registry, storage, layout, options, path)
    }

    /// Fast path: stateless syntax-only transform, straight from storage.
    ///
    /// Never touches the registry; output is written only when the
    /// transform produced no diagnostics, and the first path that does
    /// produce some aborts the batch.
    pub fn transpile(
        &self,
        storage: &dyn Storage,
        paths: &[PathBuf],
        options: &CompileOptions,
    ) -> ScriptcResult<()> {
        for path in paths {
            log::info!("transpiling {}", path.display());
            let source = storage.read_to_string(path)?;
            let (output, diagnostics) = self.backend.transpile(&source, options, path);
            if !diagnostics.is_empty() {
                return Err(reporter::escalate(&diagnostics));
            }
            storage.write(&config::output_path(path), &output)?;
        }
        Ok(())
    }
}

/// Best-effort wrapper around `emit_file`: failures here are absorbed so
/// one broken path cannot take the rest of the batch down with it.
fn compile_file(
    service: &mut dyn LanguageService,
    registry: &mut FileRegistry,
    storage: &dyn Storage,
    layout: &ProjectLayout,
    options: &CompileOptions,
    path: &Path,
) -> Vec<Diagnostic> {
    log::debug!(
        "compiling version {} of {}",
        registry.version_of(path).unwrap_or_default(),
        path.display()
    );
    match emit_file(service, registry, storage, layout, options, path) {
        Ok(diagnostics) => diagnostics,
        Err(err) => {
            log::warn!("problem compiling {}: {err}", path.display());
            Vec::new()
        }
    }
}

fn emit_file(
    service: &mut dyn LanguageService,
    registry: &mut FileRegistry,
    storage: &dyn Storage,
    layout: &ProjectLayout,
    options: &CompileOptions,
    path: &Path,
) -> ScriptcResult<Vec<Diagnostic>> {
    let mut host = RegistryHost::new(registry, storage, layout, options);
    let output = service.emit_output(&mut host, path)?;

    let mut diagnostics = Vec::new();
    if output.emit_skipped {
        log::warn!("emit skipped for {}", path.display());
        diagnostics.extend(service.options_diagnostics(&mut host)?);
        diagnostics.extend(service.syntactic_diagnostics(&mut host, path)?);
        diagnostics.extend(service.semantic_diagnostics(&mut host, path)?);
    }

    for artifact in &output.output_files {
        storage.write(&artifact.name, &artifact.text)?;
    }
    Ok(diagnostics)
}
