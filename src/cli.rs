//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `scfg-check`.
#[derive(Debug, Parser)]
#[command(
    name = "scfg-check",
    version,
    about = "Cross-check Smart Configurator settings against generated headers"
)]
pub struct Cli {
    /// Profile naming the inputs (defaults to `scfg-check.yaml` if present).
    #[arg(long, global = true, value_name = "FILE")]
    pub profile: Option<PathBuf>,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare descriptor values with `#define`s in the generated headers.
    Values(ValuesArgs),
    /// Check descriptor components against the expected module versions.
    Modules(ModulesArgs),
    /// Run `values`, then `modules`; the exit status follows `modules`.
    All {
        /// Value check inputs.
        #[command(flatten)]
        values: ValuesArgs,
        /// Expected module list (YAML or JSON).
        #[arg(long, value_name = "FILE")]
        expected: Option<PathBuf>,
    },
}

/// Inputs of the value check. Unset flags fall back to the profile.
#[derive(Debug, Clone, Default, Args)]
pub struct ValuesArgs {
    /// Configurator descriptor (`.scfg`).
    #[arg(long, value_name = "FILE")]
    pub descriptor: Option<PathBuf>,
    /// Root of the generated configuration header tree.
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
    /// Single header checked in its own pass (e.g. `FreeRTOSConfig.h`).
    #[arg(long, value_name = "FILE")]
    pub single_header: Option<PathBuf>,
    /// Name shown for the single header in diagnostics.
    #[arg(long, value_name = "LABEL")]
    pub single_label: Option<String>,
    /// Substitution table (YAML or JSON).
    #[arg(long, value_name = "FILE")]
    pub substitutions: Option<PathBuf>,
}

/// Inputs of the module check. Unset flags fall back to the profile.
#[derive(Debug, Clone, Default, Args)]
pub struct ModulesArgs {
    /// Configurator descriptor (`.scfg`).
    #[arg(long, value_name = "FILE")]
    pub descriptor: Option<PathBuf>,
    /// Expected module list (YAML or JSON).
    #[arg(long, value_name = "FILE")]
    pub expected: Option<PathBuf>,
}
