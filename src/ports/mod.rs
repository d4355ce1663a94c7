//! Port traits defining external boundaries.
//!
//! The only boundary a check run crosses is the filesystem; implementations
//! live in `src/adapters/`.

pub mod filesystem;

pub use filesystem::FileSystem;
