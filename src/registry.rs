//! Tracked-file registry and snapshot cache
//!
//! The registry owns the authoritative set of paths the compiler backend
//! sees, together with a per-path version counter and a lazily
//! materialized content snapshot. Three structures stay synchronized at
//! all times: the ordered path list the backend polls, a membership set,
//! and the path-to-state cache map. Whatever mutation runs, the three
//! always describe the same path set.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{self, ProjectLayout};
use crate::error::ScriptcResult;
use crate::fs::Storage;

/// Immutable capture of a file's text at a point in time.
///
/// Cloning shares the underlying allocation, so repeated cache hits hand
/// out the same capture.
#[derive(Debug, Clone)]
pub struct ScriptSnapshot {
    text: Arc<str>,
}

impl ScriptSnapshot {
    /// Capture the given text
    pub fn from_text(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    /// The captured text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the captured text in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Per-path tracking state
#[derive(Debug, Clone, Default)]
struct TrackedFile {
    version: u64,
    snapshot: Option<ScriptSnapshot>,
}

/// Registry of every path the compiler backend should see, with the
/// version/snapshot cache behind it.
#[derive(Debug, Default)]
pub struct FileRegistry {
    /// Registration-ordered path list, as polled by the backend
    files: Vec<PathBuf>,
    /// Membership mirror of `files`; adds go through a real set test so a
    /// re-saved path is never tracked twice, wherever it sits in the list
    tracked: HashSet<PathBuf>,
    /// Tracking state per path
    cache: HashMap<PathBuf, TrackedFile>,
    initialized: bool,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a full rescan has populated the registry
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Registered paths in registration order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.tracked.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Build or extend the tracked set.
    ///
    /// Uninitialized, or called without specific paths: full rescan. The
    /// ambient declarations are tracked first, then every source file
    /// under the resource root, then every declaration file under the
    /// typings directory, each at version 0 with no snapshot. Otherwise
    /// the given paths are added incrementally; already-tracked paths are
    /// left untouched.
    pub fn refresh(
        &mut self,
        storage: &dyn Storage,
        layout: &ProjectLayout,
        changed: &[PathBuf],
    ) -> ScriptcResult<()> {
        if !self.initialized || changed.is_empty() {
            self.clear();
            for path in layout.ambient_declarations() {
                self.track(path);
            }
            for relative in storage.scan_dir(&layout.resource_root, config::SOURCE_PATTERN)? {
                self.track(layout.resource_root.join(relative));
            }
            for relative in storage.scan_dir(&layout.typings_dir, config::DECLARATION_PATTERN)? {
                self.track(layout.typings_dir.join(relative));
            }
            self.initialized = true;
        } else {
            for path in changed {
                self.track(path.clone());
            }
        }
        Ok(())
    }

    fn track(&mut self, path: PathBuf) {
        if self.tracked.insert(path.clone()) {
            self.cache.insert(path.clone(), TrackedFile::default());
            self.files.push(path);
        }
    }

    /// Current version rendered as the backend's change-detection token
    pub fn version_of(&self, path: &Path) -> Option<String> {
        self.cache.get(path).map(|entry| entry.version.to_string())
    }

    /// Cached or freshly read snapshot for a tracked path.
    ///
    /// A missing backing file means the path left the project: it is
    /// pruned from the registry and cache, and `None` is returned without
    /// error. Repeated calls at an unchanged version are cache hits and
    /// never re-read the file.
    pub fn snapshot_of(&mut self, storage: &dyn Storage, path: &Path) -> Option<ScriptSnapshot> {
        if !storage.exists(path) {
            if self.tracked.contains(path) {
                log::debug!("pruning vanished file {}", path.display());
                self.remove(path);
            }
            return None;
        }

        let entry = match self.cache.get_mut(path) {
            Some(entry) => entry,
            None => {
                log::debug!("no tracked version for {}", path.display());
                return None;
            }
        };

        if let Some(snapshot) = &entry.snapshot {
            log::debug!("snapshot cache hit for {}", path.display());
            return Some(snapshot.clone());
        }

        match storage.read_to_string(path) {
            Ok(text) => {
                let snapshot = ScriptSnapshot::from_text(text);
                entry.snapshot = Some(snapshot.clone());
                Some(snapshot)
            }
            Err(err) => {
                log::warn!("failed reading {}: {err}", path.display());
                None
            }
        }
    }

    /// Record one external edit: the version goes up by exactly 1 and the
    /// captured text is invalidated in the same step.
    pub fn bump_version(&mut self, path: &Path) {
        if let Some(entry) = self.cache.get_mut(path) {
            entry.version += 1;
            entry.snapshot = None;
        }
    }

    /// Remove a path from registry and cache. Returns false if untracked.
    pub fn remove(&mut self, path: &Path) -> bool {
        if !self.tracked.remove(path) {
            return false;
        }
        self.cache.remove(path);
        self.files.retain(|tracked| tracked != path);
        true
    }

    fn clear(&mut self) {
        self.files.clear();
        self.tracked.clear();
        self.cache.clear();
    }

    /// Discard everything; the next refresh performs a full rescan.
    pub fn reset(&mut self) {
        self.clear();
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockStorage;
    use proptest::prelude::*;

    fn layout() -> ProjectLayout {
        ProjectLayout::new("/proj", "/proj/Resources", "/tool/ScriptSupport")
    }

    fn seeded_storage() -> MockStorage {
        let storage = MockStorage::new();
        storage.insert("/proj/Resources/a.ts", "let a = 1;");
        storage.insert("/proj/Resources/b.d.ts", "declare let b: number;");
        storage.insert("/proj/typings/lib.extra.d.ts", "declare let lib: any;");
        storage
    }

    fn assert_consistent(registry: &FileRegistry) {
        let listed: HashSet<_> = registry.files.iter().cloned().collect();
        assert_eq!(listed.len(), registry.files.len(), "duplicate in ordered list");
        assert_eq!(listed, registry.tracked);
        let cached: HashSet<_> = registry.cache.keys().cloned().collect();
        assert_eq!(listed, cached);
    }

    #[test]
    fn full_rescan_tracks_ambient_then_sources_then_typings() {
        let storage = seeded_storage();
        let mut registry = FileRegistry::new();

        registry.refresh(&storage, &layout(), &[]).unwrap();

        let files: Vec<_> = registry.files().to_vec();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/tool/ScriptSupport/lib.core.d.ts"),
                PathBuf::from("/tool/ScriptSupport/runtime.d.ts"),
                PathBuf::from("/proj/Resources/a.ts"),
                PathBuf::from("/proj/Resources/b.d.ts"),
                PathBuf::from("/proj/typings/lib.extra.d.ts"),
            ]
        );
        for path in &files {
            assert_eq!(registry.version_of(path).as_deref(), Some("0"));
        }
        assert_consistent(&registry);
    }

    #[test]
    fn incremental_refresh_adds_only_new_paths() {
        let storage = seeded_storage();
        let mut registry = FileRegistry::new();
        registry.refresh(&storage, &layout(), &[]).unwrap();
        let before = registry.len();

        let new_file = PathBuf::from("/proj/Resources/c.ts");
        registry
            .refresh(&storage, &layout(), &[new_file.clone()])
            .unwrap();

        assert_eq!(registry.len(), before + 1);
        assert_eq!(registry.version_of(&new_file).as_deref(), Some("0"));
        assert_consistent(&registry);
    }

    #[test]
    fn incremental_refresh_never_duplicates_leading_path() {
        // The first tracked path sits at index zero of the ordered list;
        // re-saving it must not create a second entry.
        let storage = seeded_storage();
        let mut registry = FileRegistry::new();
        registry.refresh(&storage, &layout(), &[]).unwrap();
        let leading = registry.files()[0].clone();
        let before = registry.len();

        registry
            .refresh(&storage, &layout(), &[leading.clone()])
            .unwrap();

        assert_eq!(registry.len(), before);
        assert_eq!(
            registry.files().iter().filter(|p| **p == leading).count(),
            1
        );
        assert_consistent(&registry);
    }

    #[test]
    fn refresh_with_paths_before_initialization_is_a_full_rescan() {
        let storage = seeded_storage();
        let mut registry = FileRegistry::new();

        registry
            .refresh(&storage, &layout(), &[PathBuf::from("/proj/Resources/a.ts")])
            .unwrap();

        // Not just the one path: ambient + scanned files are all present.
        assert_eq!(registry.len(), 5);
        assert_consistent(&registry);
    }

    #[test]
    fn snapshot_is_lazily_read_and_then_cached() {
        let storage = seeded_storage();
        let mut registry = FileRegistry::new();
        registry.refresh(&storage, &layout(), &[]).unwrap();
        let path = PathBuf::from("/proj/Resources/a.ts");

        let first = registry.snapshot_of(&storage, &path).unwrap();
        assert_eq!(first.text(), "let a = 1;");

        // A write that bypasses the invalidation protocol is not picked
        // up: the cached capture wins until the version is bumped.
        storage.insert("/proj/Resources/a.ts", "let a = 2;");
        let second = registry.snapshot_of(&storage, &path).unwrap();
        assert!(Arc::ptr_eq(&first.text, &second.text));
        assert_eq!(second.text(), "let a = 1;");
    }

    #[test]
    fn bump_version_increments_and_clears_snapshot() {
        let storage = seeded_storage();
        let mut registry = FileRegistry::new();
        registry.refresh(&storage, &layout(), &[]).unwrap();
        let path = PathBuf::from("/proj/Resources/a.ts");
        registry.snapshot_of(&storage, &path).unwrap();

        storage.insert("/proj/Resources/a.ts", "let a = 2;");
        registry.bump_version(&path);

        assert_eq!(registry.version_of(&path).as_deref(), Some("1"));
        assert!(registry.cache[&path].snapshot.is_none());

        let fresh = registry.snapshot_of(&storage, &path).unwrap();
        assert_eq!(fresh.text(), "let a = 2;");
    }

    #[test]
    fn bump_version_on_untracked_path_is_a_no_op() {
        let mut registry = FileRegistry::new();
        registry.bump_version(Path::new("/nowhere.ts"));
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_of_vanished_file_prunes_silently() {
        let storage = seeded_storage();
        let mut registry = FileRegistry::new();
        registry.refresh(&storage, &layout(), &[]).unwrap();
        let path = PathBuf::from("/proj/Resources/a.ts");
        storage.remove(&path);

        assert!(registry.snapshot_of(&storage, &path).is_none());
        assert!(!registry.contains(&path));
        assert_consistent(&registry);
    }

    #[test]
    fn remove_drops_path_everywhere_and_untracked_is_no_op() {
        let storage = seeded_storage();
        let mut registry = FileRegistry::new();
        registry.refresh(&storage, &layout(), &[]).unwrap();
        let path = PathBuf::from("/proj/Resources/a.ts");

        assert!(registry.remove(&path));
        assert!(!registry.contains(&path));
        assert!(registry.version_of(&path).is_none());
        assert_consistent(&registry);

        assert!(!registry.remove(&path));
    }

    #[test]
    fn reset_returns_to_uninitialized_and_next_refresh_rescans() {
        let storage = seeded_storage();
        let mut registry = FileRegistry::new();
        registry.refresh(&storage, &layout(), &[]).unwrap();

        registry.reset();
        assert!(registry.is_empty());
        assert!(!registry.is_initialized());

        // Passing a path to an uninitialized registry still rescans.
        registry
            .refresh(&storage, &layout(), &[PathBuf::from("/proj/Resources/a.ts")])
            .unwrap();
        assert_eq!(registry.len(), 5);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize),
        Bump(usize),
        Remove(usize),
        Snapshot(usize),
        Reset,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..8usize).prop_map(Op::Add),
            (0..8usize).prop_map(Op::Bump),
            (0..8usize).prop_map(Op::Remove),
            (0..8usize).prop_map(Op::Snapshot),
            Just(Op::Reset),
        ]
    }

    proptest! {
        /// Registry, membership set, and cache stay in lockstep under any
        /// operation sequence, and versions only ever move up by one.
        #[test]
        fn registry_stays_consistent(ops in proptest::collection::vec(op_strategy(), 1..40)) {
            let storage = MockStorage::new();
            let pool: Vec<PathBuf> = (0..8)
                .map(|i| PathBuf::from(format!("/proj/Resources/f{i}.ts")))
                .collect();
            for path in &pool {
                storage.insert(path.clone(), "content");
            }
            let mut registry = FileRegistry::new();
            registry.refresh(&storage, &layout(), &[]).unwrap();

            for op in ops {
                match op {
                    Op::Add(i) => {
                        registry.refresh(&storage, &layout(), &[pool[i].clone()]).unwrap();
                    }
                    Op::Bump(i) => {
                        let before = registry.version_of(&pool[i]);
                        registry.bump_version(&pool[i]);
                        if let Some(before) = before {
                            let after = registry.version_of(&pool[i]).unwrap();
                            prop_assert_eq!(
                                after.parse::<u64>().unwrap(),
                                before.parse::<u64>().unwrap() + 1
                            );
                            prop_assert!(registry.cache[&pool[i]].snapshot.is_none());
                        }
                    }
                    Op::Remove(i) => {
                        registry.remove(&pool[i]);
                    }
                    Op::Snapshot(i) => {
                        registry.snapshot_of(&storage, &pool[i]);
                    }
                    Op::Reset => registry.reset(),
                }
                assert_consistent(&registry);
            }
        }
    }
}
