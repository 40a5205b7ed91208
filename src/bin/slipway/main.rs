//! Slipway command-line interface.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli { globals, command } = Cli::parse();

    // Initialize tracing subscriber for logging
    let filter = if globals.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("slipway=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("slipway=info"))
    };

    // Log to stderr; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Check(args) => commands::check::execute(args, &globals),
        Commands::Resolve(args) => commands::resolve::execute(args, &globals),
        Commands::Matrix(args) => commands::matrix::execute(args, &globals),
        Commands::Build(args) => commands::build::execute(args, &globals),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
