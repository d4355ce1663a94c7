//! Core library entry for the `scfg-check` CLI.
//!
//! Cross-checks the values selected in a Smart Configurator descriptor
//! (`.scfg`) against the `#define`s in the headers generated from it, and the
//! descriptor's component list against an expected module/version list.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod compare;
pub mod context;
pub mod descriptor;
pub mod header;
pub mod modules;
pub mod normalize;
pub mod ports;
pub mod profile;
pub mod substitution;
pub mod tables;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments, returning the process exit code.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<i32, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(0);
        }
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli)
}
