//! `scfg-check modules` command.

use std::io::Write;
use std::path::PathBuf;

use crate::cli::ModulesArgs;
use crate::context::ServiceContext;
use crate::descriptor;
use crate::modules::{format_report, load_expected, reconcile};
use crate::profile::Profile;

/// Fully resolved inputs of the module check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulesInputs {
    /// Configurator descriptor.
    pub descriptor: PathBuf,
    /// Expected module list file.
    pub expected: PathBuf,
}

impl ModulesInputs {
    /// Merges command-line flags over the profile.
    ///
    /// # Errors
    ///
    /// Returns an error string if the descriptor or expected list is not named.
    pub fn resolve(args: &ModulesArgs, profile: &Profile) -> Result<Self, String> {
        Ok(Self {
            descriptor: args
                .descriptor
                .clone()
                .or_else(|| profile.descriptor.clone())
                .ok_or("No descriptor given: pass --descriptor or set it in the profile")?,
            expected: args
                .expected
                .clone()
                .or_else(|| profile.expected_modules.clone())
                .ok_or("No expected module list given: pass --expected or set it in the profile")?,
        })
    }
}

/// Execute the `modules` command, writing the report to `out`.
///
/// Returns the process exit code: `0` when every module matches, `-1`
/// otherwise.
///
/// # Errors
///
/// Returns an error string if the descriptor or expected list cannot be
/// loaded, or writing to `out` fails.
pub fn run(
    ctx: &ServiceContext,
    inputs: &ModulesInputs,
    out: &mut dyn Write,
) -> Result<i32, String> {
    let observed =
        descriptor::extract_modules(ctx, &inputs.descriptor).map_err(|e| e.to_string())?;
    let expected = load_expected(ctx, &inputs.expected).map_err(|e| e.to_string())?;
    let report = reconcile(&observed, &expected);
    writeln!(out, "{}", format_report(&inputs.descriptor, &report))
        .map_err(|e| format!("Failed to write report: {e}"))?;
    tracing::info!(mismatches = report.tally, "module check finished");
    Ok(report.exit_code())
}
