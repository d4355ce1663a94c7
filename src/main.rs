//! Binary entrypoint for the `scfg-check` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match scfg_check::run(std::env::args()) {
        Ok(0) => ExitCode::SUCCESS,
        // Exit codes are truncated to a byte, so -1 surfaces as 255.
        Ok(code) => ExitCode::from(code.to_le_bytes()[0]),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
