//! gantt CLI - binary entry point.
//!
//! ```text
//! main() -> Cli::parse() -> init_tracing() -> gantt_cli::run() -> stdout
//!                                                   |
//!                                                   v
//!                                   Session::run (authenticates per invocation)
//! ```
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gantt_cli::{Cli, core_dumps, run};

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let env_filter = if debug {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    if let Err(err) = core_dumps::disable() {
        tracing::warn!("{err:#}");
    }

    match run(cli, &mut io::stdout().lock()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
