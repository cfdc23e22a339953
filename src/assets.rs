//! Generated-asset index port
//!
//! The editor keeps an index of generated assets; the service only needs
//! to look up the output sibling of a deleted source and drop it, so the
//! port is exactly those two operations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Opaque handle to an indexed asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetHandle(u64);

/// Index of generated output assets
pub trait AssetIndex {
    /// Handle for the asset at `path`, if indexed
    fn lookup_by_path(&self, path: &Path) -> Option<AssetHandle>;

    /// Remove an asset from the index
    fn delete(&mut self, handle: AssetHandle);
}

/// Simple in-memory index, for embeddings without an asset database and
/// for tests.
#[derive(Debug, Default)]
pub struct InMemoryAssetIndex {
    next_id: u64,
    by_path: HashMap<PathBuf, AssetHandle>,
}

impl InMemoryAssetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index an asset, returning its handle
    pub fn insert(&mut self, path: impl Into<PathBuf>) -> AssetHandle {
        let handle = AssetHandle(self.next_id);
        self.next_id += 1;
        self.by_path.insert(path.into(), handle);
        handle
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.by_path.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

impl AssetIndex for InMemoryAssetIndex {
    fn lookup_by_path(&self, path: &Path) -> Option<AssetHandle> {
        self.by_path.get(path).copied()
    }

    fn delete(&mut self, handle: AssetHandle) {
        self.by_path.retain(|_, indexed| *indexed != handle);
    }
}
