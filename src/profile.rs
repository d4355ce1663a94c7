//! Check profiles: YAML files naming the inputs of a run.
//!
//! ```yaml
//! descriptor: aws_ryz014a_ck_rx65n.scfg
//! config_dir: src/smc_gen/r_config
//! single_header: src/frtos_config/FreeRTOSConfig.h
//! substitutions: tools/macro_values.yaml
//! expected_modules: tools/expected_modules.yaml
//! ```
//!
//! Relative paths are resolved against the directory holding the profile.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::context::ServiceContext;
use crate::tables::{self, TableError};

/// Profile file looked up in the working directory when none is named.
pub const DEFAULT_PROFILE: &str = "scfg-check.yaml";

/// Environment variable naming a profile file.
pub const PROFILE_ENV: &str = "SCFG_CHECK_PROFILE";

/// Failure to load a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// An explicitly named profile does not exist.
    #[error("profile {} not found", .0.display())]
    NotFound(PathBuf),
    /// The profile exists but could not be read or parsed.
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Input locations for a check run. Every field is optional; command-line
/// flags fill in or override what the profile leaves out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// The configurator descriptor (`.scfg`).
    pub descriptor: Option<PathBuf>,
    /// Root of the generated configuration header tree.
    pub config_dir: Option<PathBuf>,
    /// A single named header checked in its own pass.
    pub single_header: Option<PathBuf>,
    /// Diagnostic label for the single header; defaults to its file name.
    pub single_label: Option<String>,
    /// Substitution table file.
    pub substitutions: Option<PathBuf>,
    /// Expected module list file.
    pub expected_modules: Option<PathBuf>,
}

impl Profile {
    /// Loads a profile and resolves its relative paths.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] if the file is missing or malformed.
    pub fn load(ctx: &ServiceContext, path: &Path) -> Result<Self, ProfileError> {
        if !ctx.fs.exists(path) {
            return Err(ProfileError::NotFound(path.to_path_buf()));
        }
        let profile: Self = tables::load(ctx, path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        tracing::debug!(path = %path.display(), "loaded profile");
        Ok(profile.relative_to(base))
    }

    /// Finds the profile for this run.
    ///
    /// An explicit path wins, then [`PROFILE_ENV`], then [`DEFAULT_PROFILE`]
    /// if it exists. With none of these the empty profile is used.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] if an explicitly named profile (argument or
    /// environment) is missing, or any chosen profile is malformed.
    pub fn discover(ctx: &ServiceContext, explicit: Option<&Path>) -> Result<Self, ProfileError> {
        if let Some(path) = explicit {
            return Self::load(ctx, path);
        }
        if let Ok(path) = std::env::var(PROFILE_ENV) {
            return Self::load(ctx, Path::new(&path));
        }
        let default = Path::new(DEFAULT_PROFILE);
        if ctx.fs.exists(default) {
            return Self::load(ctx, default);
        }
        Ok(Self::default())
    }

    fn relative_to(self, base: &Path) -> Self {
        let resolve = |p: Option<PathBuf>| p.map(|p| if p.is_absolute() { p } else { base.join(p) });
        Self {
            descriptor: resolve(self.descriptor),
            config_dir: resolve(self.config_dir),
            single_header: resolve(self.single_header),
            single_label: self.single_label,
            substitutions: resolve(self.substitutions),
            expected_modules: resolve(self.expected_modules),
        }
    }
}
