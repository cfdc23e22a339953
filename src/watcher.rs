//! Standalone file watcher
//!
//! Stand-in event source for embeddings without an editor bus: watches
//! the resource tree, debounces bursts of file-system noise, and turns
//! each settled change into a save or delete dispatch against the
//! service registry. Emits NDJSON-serializable events for CI consumers.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;

use crate::config;
use crate::error::ScriptcResult;
use crate::events::{ResourceEvent, ServiceRegistry};

/// Debounce duration in milliseconds
const DEBOUNCE_MS: u64 = 100;

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Directory to watch, usually the project's resource root
    pub root: PathBuf,
    /// How long a change set must sit still before dispatch
    pub debounce: Duration,
}

impl WatchOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            debounce: Duration::from_millis(DEBOUNCE_MS),
        }
    }
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    Started { root: String },
    FileChanged { path: String },
    CompileStarted { path: String },
    CompileComplete { path: String },
    CompileFailed { path: String, message: String },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Pending change set for debouncing
struct PendingChanges {
    paths: HashSet<PathBuf>,
    last_change: Option<Instant>,
    debounce: Duration,
}

impl PendingChanges {
    fn new(debounce: Duration) -> Self {
        Self {
            paths: HashSet::new(),
            last_change: None,
            debounce,
        }
    }

    fn record(&mut self, path: PathBuf) {
        self.paths.insert(path);
        self.last_change = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        match self.last_change {
            Some(last) => !self.paths.is_empty() && last.elapsed() >= self.debounce,
            None => false,
        }
    }

    fn take(&mut self) -> Vec<PathBuf> {
        let paths: Vec<_> = self.paths.drain().collect();
        self.last_change = None;
        paths
    }
}

/// Watch for source changes and dispatch them until `running` is cleared.
///
/// A settled path that still exists dispatches as a save, a vanished one
/// as a delete. Diagnostics from a dispatch surface as `CompileFailed`
/// events and the loop keeps going; only watcher-setup failures abort.
pub fn watch(
    options: WatchOptions,
    services: &ServiceRegistry,
    running: Arc<AtomicBool>,
    on_event: impl Fn(WatchEvent),
) -> ScriptcResult<()> {
    on_event(WatchEvent::Started {
        root: options.root.display().to_string(),
    });

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |result: Result<Event, notify::Error>| {
            if let Ok(event) = result {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        },
        Config::default(),
    )
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    watcher
        .watch(&options.root, RecursiveMode::Recursive)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let mut pending = PendingChanges::new(options.debounce);

    while running.load(Ordering::SeqCst) {
        if let Ok(path) = rx.recv_timeout(Duration::from_millis(50)) {
            if config::is_source(&path) {
                on_event(WatchEvent::FileChanged {
                    path: path.display().to_string(),
                });
                pending.record(path);
            }
        }

        if pending.ready() {
            for path in pending.take() {
                let display = path.display().to_string();
                let event = if path.exists() {
                    ResourceEvent::Saved { path }
                } else {
                    ResourceEvent::Deleted { path }
                };
                on_event(WatchEvent::CompileStarted {
                    path: display.clone(),
                });
                match services.dispatch_resource(&event) {
                    Ok(()) => on_event(WatchEvent::CompileComplete { path: display }),
                    Err(err) => on_event(WatchEvent::CompileFailed {
                        path: display,
                        message: err.to_string(),
                    }),
                }
            }
        }
    }

    on_event(WatchEvent::Shutdown);
    Ok(())
}
