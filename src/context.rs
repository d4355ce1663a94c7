//! Service context bundling the port trait objects a check run uses.

use crate::adapters::live::LiveFileSystem;
use crate::adapters::memory::MemoryFileSystem;
use crate::ports::filesystem::FileSystem;

/// Bundles all port trait objects into a single context.
///
/// Constructors wire up different adapter implementations (live, in-memory).
pub struct ServiceContext {
    /// Filesystem for reading descriptors, headers, and table files.
    pub fs: Box<dyn FileSystem>,
}

impl ServiceContext {
    /// Creates a live context backed by the real disk.
    #[must_use]
    pub fn live() -> Self {
        Self { fs: Box::new(LiveFileSystem) }
    }

    /// Creates a context that serves files from memory.
    #[must_use]
    pub fn in_memory(fs: MemoryFileSystem) -> Self {
        Self { fs: Box::new(fs) }
    }
}
