//! Loading of externally supplied lookup tables.
//!
//! Tables are YAML documents unless the file extension is `.json`.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::context::ServiceContext;

/// Failure to load a lookup table file.
#[derive(Debug, Error)]
pub enum TableError {
    /// The table file could not be read.
    #[error("failed to read table {}: {error}", path.display())]
    Read {
        /// Path of the table file.
        path: PathBuf,
        /// Underlying I/O failure.
        error: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The table file is not valid YAML/JSON for the expected shape.
    #[error("failed to parse table {}: {message}", path.display())]
    Parse {
        /// Path of the table file.
        path: PathBuf,
        /// Deserializer message.
        message: String,
    },
}

/// Reads and deserializes a table file through `ctx.fs`.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be read or does not match `T`.
pub fn load<T: DeserializeOwned>(ctx: &ServiceContext, path: &Path) -> Result<T, TableError> {
    let content = ctx
        .fs
        .read_to_string(path)
        .map_err(|error| TableError::Read { path: path.to_path_buf(), error })?;
    parse(path, &content)
}

fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, TableError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| TableError::Parse { path: path.to_path_buf(), message })
}
