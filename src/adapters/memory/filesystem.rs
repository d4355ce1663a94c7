//! In-memory adapter for the `FileSystem` port.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::ports::filesystem::FileSystem;

/// Serves files from an in-memory map keyed by path.
///
/// Directories are implicit: a directory exists when any file lives under it.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file, returning `self` for chaining.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Adds (or replaces) a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(String::from_utf8(self.read_bytes(path)?)?)
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| format!("{}: no such file", path.display()).into())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.keys().any(|p| p.starts_with(path))
    }

    fn files_with_suffix(
        &self,
        root: &Path,
        suffix: &str,
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>> {
        if !self.files.keys().any(|p| p != root && p.starts_with(root)) {
            return Err(format!("{} is not a directory", root.display()).into());
        }
        Ok(self
            .files
            .keys()
            .filter(|p| p.starts_with(root))
            .filter(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with(suffix)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_matching_files_under_root() {
        let fs = MemoryFileSystem::new()
            .with_file("cfg/b.h", "")
            .with_file("cfg/sub/a.h", "")
            .with_file("cfg/readme.md", "")
            .with_file("other/c.h", "");

        let files = fs.files_with_suffix(Path::new("cfg"), ".h").unwrap();
        assert_eq!(files, vec![PathBuf::from("cfg/b.h"), PathBuf::from("cfg/sub/a.h")]);
    }

    #[test]
    fn unknown_root_is_an_error() {
        let fs = MemoryFileSystem::new().with_file("cfg/a.h", "");
        assert!(fs.files_with_suffix(Path::new("nowhere"), ".h").is_err());
    }

    #[test]
    fn text_reads_reject_invalid_utf8() {
        let fs = MemoryFileSystem::new().with_file("a.h", b"#define A 1 // \xff\n".to_vec());
        assert!(fs.read_to_string(Path::new("a.h")).is_err());
        assert_eq!(fs.read_bytes(Path::new("a.h")).unwrap(), b"#define A 1 // \xff\n");
    }

    #[test]
    fn reading_missing_file_fails() {
        let fs = MemoryFileSystem::new();
        assert!(fs.read_to_string(Path::new("x.h")).is_err());
        assert!(fs.read_bytes(Path::new("x.h")).is_err());
        assert!(!fs.exists(Path::new("x.h")));
    }
}
