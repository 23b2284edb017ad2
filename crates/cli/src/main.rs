//! ss33 - dual-tier object storage CLI
//!
//! Put, get, stat and remove objects in the permanent or cache bucket of a
//! storage set, or purge a key from both.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ss33_cli::commands::{self, Cli};
use ss33_cli::exit_code::ExitCode;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = tokio::select! {
        code = commands::execute(cli) => code,
        _ = tokio::signal::ctrl_c() => ExitCode::Interrupted,
    };

    std::process::exit(exit_code.as_i32());
}
