//! Filesystem port for read-only file access.

use std::path::{Path, PathBuf};

/// Provides the read-only filesystem access a check run needs.
///
/// Abstracting the filesystem lets descriptor extraction and header scanning
/// run against in-memory fixtures without touching the real disk.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    /// Reads the raw bytes of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;

    /// Returns `true` if the path exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Lists every file under `root` whose name ends with `suffix`,
    /// descending into subdirectories.
    ///
    /// The order is deterministic: entries are visited sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be read.
    fn files_with_suffix(
        &self,
        root: &Path,
        suffix: &str,
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>>;
}
