//! scriptc - incremental script compilation service
//!
//! scriptc keeps a per-file version/snapshot cache over a project's
//! script sources and drives a stateful compiler-services backend through
//! it: saves recompile only what changed, deletes reconcile generated
//! output, and project load/unload rebuild the cache from the file
//! system. A stateless transpile fast path trades type checking for
//! latency.

pub mod assets;
pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod fs;
pub mod host;
pub mod options;
pub mod orchestrator;
pub mod registry;
pub mod reporter;
pub mod service;
pub mod watcher;

// Re-exports for convenience
pub use assets::{AssetHandle, AssetIndex, InMemoryAssetIndex};
pub use backend::{
    BackendError, BackendResult, CompilerBackend, Diagnostic, EmitOutput, LanguageService,
    OutputArtifact, Position, ScriptHost,
};
pub use config::{ConfigWarning, ProjectLayout, ServiceConfig};
pub use error::{ScriptcError, ScriptcResult};
pub use events::{ProjectEvent, ProjectHandler, ResourceEvent, ResourceHandler, ServiceRegistry};
pub use fs::{LocalStorage, Storage};
pub use host::RegistryHost;
pub use options::{CompileOptions, ModuleKind, ScriptTarget};
pub use orchestrator::CompileOrchestrator;
pub use registry::{FileRegistry, ScriptSnapshot};
pub use service::ScriptService;
pub use watcher::{watch, WatchEvent, WatchOptions};
