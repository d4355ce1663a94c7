//! `scfg-check values` command.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::ValuesArgs;
use crate::compare::{Comparator, ScanPass, Tally};
use crate::context::ServiceContext;
use crate::descriptor::{self, ConfigItems};
use crate::header::{HeaderScanner, MacroDefinition};
use crate::profile::Profile;
use crate::substitution::SubstitutionTable;

/// Fully resolved inputs of the value check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuesInputs {
    /// Configurator descriptor.
    pub descriptor: PathBuf,
    /// Root of the generated header tree, if checked.
    pub config_dir: Option<PathBuf>,
    /// Single header, if checked.
    pub single_header: Option<PathBuf>,
    /// Label for the single header.
    pub single_label: Option<String>,
    /// Substitution table file, if any.
    pub substitutions: Option<PathBuf>,
}

impl ValuesInputs {
    /// Merges command-line flags over the profile.
    ///
    /// # Errors
    ///
    /// Returns an error string if no descriptor is named, or neither a header
    /// tree nor a single header is.
    pub fn resolve(args: &ValuesArgs, profile: &Profile) -> Result<Self, String> {
        let inputs = Self {
            descriptor: args
                .descriptor
                .clone()
                .or_else(|| profile.descriptor.clone())
                .ok_or("No descriptor given: pass --descriptor or set it in the profile")?,
            config_dir: args.config_dir.clone().or_else(|| profile.config_dir.clone()),
            single_header: args.single_header.clone().or_else(|| profile.single_header.clone()),
            single_label: args.single_label.clone().or_else(|| profile.single_label.clone()),
            substitutions: args.substitutions.clone().or_else(|| profile.substitutions.clone()),
        };
        if inputs.config_dir.is_none() && inputs.single_header.is_none() {
            return Err("Nothing to check: pass --config-dir and/or --single-header".to_string());
        }
        Ok(inputs)
    }

    fn single_pass_label(&self, header: &Path) -> String {
        self.single_label.clone().unwrap_or_else(|| {
            header.file_name().map_or_else(
                || header.display().to_string(),
                |name| name.to_string_lossy().into_owned(),
            )
        })
    }
}

/// Execute the `values` command, writing diagnostics to `out`.
///
/// Prints one line per mismatch as it is found, then the final status line.
/// Mismatches never fail the command; the returned tally carries them.
///
/// # Errors
///
/// Returns an error string if the descriptor, the substitution table, the
/// header tree root or the single header cannot be loaded, or writing to
/// `out` fails.
pub fn run(
    ctx: &ServiceContext,
    inputs: &ValuesInputs,
    out: &mut dyn Write,
) -> Result<Tally, String> {
    let substitutions = match &inputs.substitutions {
        Some(path) => SubstitutionTable::load(ctx, path).map_err(|e| e.to_string())?,
        None => SubstitutionTable::new(),
    };
    let items = descriptor::extract(ctx, &inputs.descriptor).map_err(|e| e.to_string())?;
    let scanner = HeaderScanner::new(ctx);

    // Both header sources are opened before anything is printed.
    let tree = match &inputs.config_dir {
        Some(root) => Some(scanner.scan_tree(root).map_err(|e| e.to_string())?),
        None => None,
    };
    let single = match &inputs.single_header {
        Some(header) => Some((header, scanner.scan_file(header).map_err(|e| e.to_string())?)),
        None => None,
    };

    let mut tally = Tally::default();
    if let Some(macros) = tree {
        let comparator = Comparator::new(&substitutions, ScanPass::ConfigTree);
        tally += emit(&comparator, macros, &items, out)?;
    }
    if let Some((header, macros)) = single {
        let pass = ScanPass::single_file(inputs.single_pass_label(header));
        let comparator = Comparator::new(&substitutions, pass);
        tally += emit(&comparator, macros.into_iter(), &items, out)?;
    }

    writeln!(out, "{}", tally.summary()).map_err(|e| format!("Failed to write report: {e}"))?;
    tracing::info!(errors = tally.errors, warnings = tally.warnings, "value check finished");
    Ok(tally)
}

fn emit(
    comparator: &Comparator<'_>,
    macros: impl Iterator<Item = MacroDefinition>,
    items: &ConfigItems,
    out: &mut dyn Write,
) -> Result<Tally, String> {
    let mut tally = Tally::default();
    for mismatch in comparator.mismatches(macros, items) {
        writeln!(out, "{mismatch}").map_err(|e| format!("Failed to write report: {e}"))?;
        tally.record(&mismatch);
    }
    Ok(tally)
}
