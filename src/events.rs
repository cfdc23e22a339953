//! Editor event interface
//!
//! The host editor delivers resource and project lifecycle events; the
//! service registers once against both families and the registry
//! dispatches. Handlers are `Rc<RefCell<_>>` because one service
//! typically implements both traits and the whole model is
//! single-threaded.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::ScriptcResult;

/// Resource lifecycle events carrying the affected path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEvent {
    Saved { path: PathBuf },
    Deleted { path: PathBuf },
}

/// Project lifecycle events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectEvent {
    Loaded { path: PathBuf },
    Unloaded,
}

/// Handler for resource events
pub trait ResourceHandler {
    /// Can this handler process a save of `path`?
    fn can_handle(&self, path: &Path) -> bool;

    /// Can this handler process a delete of `path`?
    fn can_handle_delete(&self, path: &Path) -> bool;

    fn on_saved(&mut self, path: &Path) -> ScriptcResult<()>;

    fn on_deleted(&mut self, path: &Path) -> ScriptcResult<()>;
}

/// Handler for project events
pub trait ProjectHandler {
    fn on_project_loaded(&mut self, path: &Path) -> ScriptcResult<()>;

    fn on_project_unloaded(&mut self) -> ScriptcResult<()>;
}

/// Registry of event handlers, dispatching in registration order.
///
/// Handler errors propagate straight to the dispatching caller; a
/// diagnostics escalation from a save lands on whoever delivered the
/// event.
#[derive(Default)]
pub struct ServiceRegistry {
    resource_handlers: Vec<Rc<RefCell<dyn ResourceHandler>>>,
    project_handlers: Vec<Rc<RefCell<dyn ProjectHandler>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_resource(&mut self, handler: Rc<RefCell<dyn ResourceHandler>>) {
        self.resource_handlers.push(handler);
    }

    pub fn register_project(&mut self, handler: Rc<RefCell<dyn ProjectHandler>>) {
        self.project_handlers.push(handler);
    }

    /// Dispatch a resource event to every handler that claims it
    pub fn dispatch_resource(&self, event: &ResourceEvent) -> ScriptcResult<()> {
        for handler in &self.resource_handlers {
            let mut handler = handler.borrow_mut();
            match event {
                ResourceEvent::Saved { path } => {
                    if handler.can_handle(path) {
                        handler.on_saved(path)?;
                    }
                }
                ResourceEvent::Deleted { path } => {
                    if handler.can_handle_delete(path) {
                        handler.on_deleted(path)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Dispatch a project event to every registered handler
    pub fn dispatch_project(&self, event: &ProjectEvent) -> ScriptcResult<()> {
        for handler in &self.project_handlers {
            let mut handler = handler.borrow_mut();
            match event {
                ProjectEvent::Loaded { path } => handler.on_project_loaded(path)?,
                ProjectEvent::Unloaded => handler.on_project_unloaded()?,
            }
        }
        Ok(())
    }
}
