//! Prybar CLI - pluggable command-line tool
//!
//! Binary name: `prybar`

use std::process;

use prybar::cli::{format_error, run_cli};

fn main() {
    // The subscriber must exist before dispatch, so --trace is picked off
    // the raw argument vector rather than the parsed one.
    let trace = std::env::args().any(|arg| arg == "--trace" || arg == "-t");
    let default_level = if trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_cli() {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {}", format_error(&err));
        }

        let code = err
            .downcast_ref::<prybar_core::Error>()
            .map(prybar_core::Error::exit_code)
            .unwrap_or(1);

        #[allow(clippy::exit)]
        process::exit(code);
    }
}
