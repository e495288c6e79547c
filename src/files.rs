//! File access capability injected into the cache
//!
//! Loadables never touch the filesystem directly; they read through a
//! [`FileSource`] so the same cache can run against a directory on disk or
//! an in-memory table in tests and tools.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::ContentError;

/// Read-only access to content bytes by path
pub trait FileSource {
    /// Read the full contents of a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read
    fn read(&self, path: &str) -> Result<Vec<u8>, ContentError>;

    /// Check whether a file exists
    fn exists(&self, path: &str) -> bool;

    /// Read a file as UTF-8 text
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8
    fn read_to_string(&self, path: &str) -> Result<String, ContentError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes)
            .map_err(|e| ContentError::DecodeError(format!("'{path}' is not UTF-8: {e}")))
    }
}

/// Files resolved relative to a root directory
#[derive(Debug, Clone)]
pub struct DiskFiles {
    root: PathBuf,
}

impl DiskFiles {
    /// Create a source rooted at the given directory
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path for a content path
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl FileSource for DiskFiles {
    fn read(&self, path: &str) -> Result<Vec<u8>, ContentError> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Err(ContentError::NotFound(full.display().to_string()));
        }
        fs::read(&full).map_err(|e| ContentError::IoError(format!("{}: {e}", full.display())))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }
}

/// In-memory file table.
///
/// Files can be replaced while a cache is reading from it, which makes it
/// handy for exercising reloads.
#[derive(Debug, Default)]
pub struct MemoryFiles {
    files: RefCell<FxHashMap<String, Vec<u8>>>,
}

impl MemoryFiles {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file
    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.borrow_mut().insert(path.into(), bytes.into());
    }

    /// Remove a file, returning whether it existed
    pub fn remove(&self, path: &str) -> bool {
        self.files.borrow_mut().remove(path).is_some()
    }

    /// Number of stored files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    /// Check if the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }
}

impl FileSource for MemoryFiles {
    fn read(&self, path: &str) -> Result<Vec<u8>, ContentError> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| ContentError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.files.borrow().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_files() {
        let files = MemoryFiles::new();
        files.insert("a.txt", "hello");

        assert!(files.exists("a.txt"));
        assert!(!files.exists("b.txt"));
        assert_eq!(files.read_to_string("a.txt").unwrap(), "hello");
        assert_eq!(
            files.read("b.txt"),
            Err(ContentError::NotFound("b.txt".to_string()))
        );

        assert!(files.remove("a.txt"));
        assert!(files.is_empty());
    }

    #[test]
    fn test_invalid_utf8() {
        let files = MemoryFiles::new();
        files.insert("bin", vec![0xff, 0xfe]);
        assert!(matches!(
            files.read_to_string("bin"),
            Err(ContentError::DecodeError(_))
        ));
    }

    #[test]
    fn test_disk_files_missing() {
        let files = DiskFiles::new(std::env::temp_dir().join("engine_content_missing_root"));
        assert!(!files.exists("nothing.png"));
        assert!(matches!(
            files.read("nothing.png"),
            Err(ContentError::NotFound(_))
        ));
    }

    #[test]
    fn test_disk_files_read() {
        let root = std::env::temp_dir().join(format!("engine_content_disk_{}", std::process::id()));
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("note.txt"), "on disk").unwrap();

        let files = DiskFiles::new(&root);
        assert!(files.exists("note.txt"));
        assert_eq!(files.read_to_string("note.txt").unwrap(), "on disk");

        fs::remove_dir_all(&root).unwrap();
    }
}
