//! Storage abstraction
//!
//! The service never touches the disk directly; everything goes through
//! the `Storage` trait so tests can run against an in-memory tree.

use std::io::Write;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};

use crate::error::{ScriptcError, ScriptcResult};

/// Abstract storage interface
///
/// Implementations:
/// - `LocalStorage` - standard file I/O
/// - `MockStorage` - in-memory for testing
pub trait Storage {
    /// Read a file's full text
    fn read_to_string(&self, path: &Path) -> ScriptcResult<String>;

    /// Write content, overwriting any existing file. The handle is flushed
    /// and closed on every exit path.
    fn write(&self, path: &Path, contents: &str) -> ScriptcResult<()>;

    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Recursively scan `root` for files matching a glob pattern,
    /// returning paths relative to `root` in sorted order. A missing root
    /// yields an empty list.
    fn scan_dir(&self, root: &Path, pattern: &str) -> ScriptcResult<Vec<PathBuf>>;
}

fn compile_pattern(pattern: &str) -> ScriptcResult<GlobMatcher> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| ScriptcError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// Local disk storage
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// Create a new LocalStorage instance
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn read_to_string(&self, path: &Path) -> ScriptcResult<String> {
        std::fs::read_to_string(path).map_err(Into::into)
    }

    fn write(&self, path: &Path, contents: &str) -> ScriptcResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn scan_dir(&self, root: &Path, pattern: &str) -> ScriptcResult<Vec<PathBuf>> {
        let matcher = compile_pattern(pattern)?;
        let mut found = Vec::new();
        if root.is_dir() {
            scan_recursive(root, root, &matcher, &mut found)?;
        }
        found.sort();
        Ok(found)
    }
}

fn scan_recursive(
    root: &Path,
    dir: &Path,
    matcher: &GlobMatcher,
    found: &mut Vec<PathBuf>,
) -> ScriptcResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            scan_recursive(root, &path, matcher, found)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            if matcher.is_match(relative) {
                found.push(relative.to_path_buf());
            }
        }
    }
    Ok(())
}

/// Mock storage for testing
///
/// Uses `Arc<Mutex<>>` internally so it can be cloned and shared with the
/// service under test.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct MockStorage {
    pub files: std::sync::Arc<std::sync::Mutex<std::collections::HashMap<PathBuf, String>>>,
}

#[cfg(test)]
impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), contents.into());
    }

    pub fn remove(&self, path: &Path) {
        self.files.lock().unwrap().remove(path);
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

#[cfg(test)]
impl Storage for MockStorage {
    fn read_to_string(&self, path: &Path) -> ScriptcResult<String> {
        self.contents(path).ok_or_else(|| {
            ScriptcError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "file not found",
            ))
        })
    }

    fn write(&self, path: &Path, contents: &str) -> ScriptcResult<()> {
        self.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn scan_dir(&self, root: &Path, pattern: &str) -> ScriptcResult<Vec<PathBuf>> {
        let matcher = compile_pattern(pattern)?;
        let mut found: Vec<PathBuf> = self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter_map(|path| path.strip_prefix(root).ok().map(Path::to_path_buf))
            .filter(|relative| matcher.is_match(relative))
            .collect();
        found.sort();
        Ok(found)
    }
}
