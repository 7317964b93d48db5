//! routespec CLI
//!
//! Commands:
//!   render   - Registration code from an IR dump
//!   openapi  - OpenAPI document from an IR dump
//!   symbols  - Allocated identifiers
//!   schema   - Config file JSON Schema

mod cli;

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    cli::util::init_logging(cli.verbose);

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(category = ?e.category(), "command failed");
            let _ = writeln!(std::io::stderr(), "Error: {}", e);
            ExitCode::from(1)
        }
    }
}
