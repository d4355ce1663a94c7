//! Command dispatch and handlers.

pub mod modules;
pub mod values;

use std::io::Write;

use crate::cli::{Cli, Command, ModulesArgs};
use crate::context::ServiceContext;
use crate::profile::Profile;

use self::modules::ModulesInputs;
use self::values::ValuesInputs;

/// Dispatch a parsed command line to its handler, printing to stdout.
///
/// Returns the process exit code.
///
/// # Errors
///
/// Returns an error string if the profile or a handler fails.
pub fn dispatch(cli: &Cli) -> Result<i32, String> {
    let ctx = ServiceContext::live();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dispatch_with_context(cli, &ctx, &mut out)
}

/// Dispatch a command with the given service context and output stream.
///
/// # Errors
///
/// Returns an error string if the profile or a handler fails.
pub fn dispatch_with_context(
    cli: &Cli,
    ctx: &ServiceContext,
    out: &mut dyn Write,
) -> Result<i32, String> {
    let profile = Profile::discover(ctx, cli.profile.as_deref()).map_err(|e| e.to_string())?;

    match &cli.command {
        Command::Values(args) => {
            let inputs = ValuesInputs::resolve(args, &profile)?;
            values::run(ctx, &inputs, out)?;
            Ok(0)
        }
        Command::Modules(args) => {
            let inputs = ModulesInputs::resolve(args, &profile)?;
            modules::run(ctx, &inputs, out)
        }
        Command::All { values: args, expected } => {
            let value_inputs = ValuesInputs::resolve(args, &profile)?;
            let module_args =
                ModulesArgs { descriptor: args.descriptor.clone(), expected: expected.clone() };
            let module_inputs = ModulesInputs::resolve(&module_args, &profile)?;
            values::run(ctx, &value_inputs, out)?;
            modules::run(ctx, &module_inputs, out)
        }
    }
}
