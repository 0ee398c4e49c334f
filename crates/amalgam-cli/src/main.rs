//! Amalgam CLI - merge a directory of related tables.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Commands::Inspect { dir, json } => commands::inspect::run(dir, json, config),

        Commands::Preview { dir, table, rows } => commands::preview::run(dir, table, rows, config),

        Commands::Merge(args) => commands::merge::run(args, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` overrides the default level unless `--verbose`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
