//! daword CLI - HTTPS edge proxy and document tools for the docassemble Word add-in

mod cli;
mod document_cmd;
mod error;
mod output;
mod serve_cmd;

use clap::Parser;
use cli::{Cli, Commands};
use error::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("daword: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the per-command default.
fn init_tracing(cli: &Cli) {
    let base = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    let level = match cli.verbose {
        0 => base,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve(args) => {
            output::print_banner(cli.silent);
            serve_cmd::run_serve(args, cli.silent)
        }
        Commands::Scan(args) => document_cmd::run_scan(args, cli.silent),
        Commands::Clause(args) => document_cmd::run_clause(args),
    }
}
