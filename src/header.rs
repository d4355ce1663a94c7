//! Header scanning for `#define` declarations.
//!
//! The scan is line-based and deliberately shallow: a line is a candidate
//! only if it starts with `#define` once comments are cut off, and it yields
//! a declaration only if it splits into exactly three whitespace-separated
//! fields (keyword, name, value). Everything else is skipped without error.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::context::ServiceContext;

/// Keyword that starts a declaration line.
pub const DEFINE_KEYWORD: &str = "#define";

/// File suffix of scanned headers.
pub const HEADER_SUFFIX: &str = ".h";

/// A `#define NAME VALUE` declaration found in a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    /// Declared macro name.
    pub name: String,
    /// Everything after the name, as written (comments removed).
    pub value: String,
    /// File the declaration was read from.
    pub source: PathBuf,
}

/// Parses one header line into `(name, value)`.
///
/// The line is cut at the first `/*`, then at the first `//`.
#[must_use]
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.split("/*").next().unwrap_or_default();
    let line = line.split("//").next().unwrap_or_default();
    if !line.starts_with(DEFINE_KEYWORD) {
        return None;
    }
    match split_fields(line).as_slice() {
        [_, name, value] => Some((*name, *value)),
        _ => None,
    }
}

/// Splits on runs of whitespace into at most three fields. The third field
/// is the untouched remainder after the second separator.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(3);
    let mut rest = line.trim_start();
    while fields.len() < 2 && !rest.is_empty() {
        if let Some(end) = rest.find(char::is_whitespace) {
            fields.push(&rest[..end]);
            rest = rest[end..].trim_start();
        } else {
            fields.push(rest);
            rest = "";
        }
    }
    if !rest.is_empty() {
        fields.push(rest);
    }
    fields
}

/// Scans header text, yielding each declaration in line order.
pub fn scan_text<'a>(text: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    text.lines().filter_map(parse_line)
}

/// Failure to open a header source named by the caller.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// The header tree root could not be listed.
    #[error("failed to list header directory {}: {error}", root.display())]
    List {
        /// Root of the header tree.
        root: PathBuf,
        /// Underlying I/O failure.
        error: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A single header could not be read.
    #[error("failed to read header {}: {error}", path.display())]
    Read {
        /// Path of the header.
        path: PathBuf,
        /// Underlying I/O failure.
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Scans headers through the context's filesystem.
///
/// Headers are read as bytes and decoded lossily, so a comment in a legacy
/// encoding does not hide the declarations around it.
pub struct HeaderScanner<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> HeaderScanner<'a> {
    /// Creates a scanner reading through `ctx.fs`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Declarations from every `.h` file under `root`, file by file in
    /// sorted walk order.
    ///
    /// The root is listed up front. A file found by the walk that cannot be
    /// read is skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::List`] if `root` cannot be listed.
    pub fn scan_tree(
        &self,
        root: &Path,
    ) -> Result<impl Iterator<Item = MacroDefinition> + 'a, HeaderError> {
        let files = self
            .ctx
            .fs
            .files_with_suffix(root, HEADER_SUFFIX)
            .map_err(|error| HeaderError::List { root: root.to_path_buf(), error })?;
        tracing::debug!(root = %root.display(), files = files.len(), "scanning header tree");
        let ctx = self.ctx;
        Ok(files.into_iter().flat_map(move |path| match read_declarations(ctx, &path) {
            Ok(defs) => defs,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable header");
                Vec::new()
            }
        }))
    }

    /// Declarations from a single header file.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::Read`] if the file cannot be read.
    pub fn scan_file(&self, path: &Path) -> Result<Vec<MacroDefinition>, HeaderError> {
        read_declarations(self.ctx, path)
    }
}

fn read_declarations(
    ctx: &ServiceContext,
    path: &Path,
) -> Result<Vec<MacroDefinition>, HeaderError> {
    let bytes = ctx
        .fs
        .read_bytes(path)
        .map_err(|error| HeaderError::Read { path: path.to_path_buf(), error })?;
    let text = String::from_utf8_lossy(&bytes);
    let defs: Vec<MacroDefinition> = scan_text(&text)
        .map(|(name, value)| MacroDefinition {
            name: name.to_string(),
            value: value.to_string(),
            source: path.to_path_buf(),
        })
        .collect();
    tracing::debug!(path = %path.display(), declarations = defs.len(), "scanned header");
    Ok(defs)
}
