//! CLI argument definitions for daword
//!
//! Uses clap for argument parsing. This module defines all subcommands
//! and their options.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// daword - docassemble for Word
///
/// Runs the HTTPS edge proxy that lets Word embed a docassemble server as a
/// task pane, and runs the task pane's document tools against text files.
#[derive(Parser, Debug)]
#[command(name = "daword")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Silent mode - suppress the banner and status output
    #[arg(long, short = 's', global = true)]
    pub silent: bool,

    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTPS edge proxy in front of a docassemble server
    #[command(after_help = "EXAMPLES:
    # Proxy https://localhost:8444 to http://localhost with a generated certificate
    daword serve

    # Different port and origin
    daword serve --port 9443 --origin http://docassemble.internal:8080

    # Use an existing certificate
    daword serve --cert certs/localhost.pem --key certs/localhost-key.pem

    # Load settings from a JSON file, then override the port
    PORT=8445 daword serve --config proxy.json
")]
    Serve(ServeArgs),

    /// Scan a document for {{ variables }} and print an interview template
    #[command(after_help = "EXAMPLES:
    # Print the interview template for a document
    daword scan contract.txt

    # List the variables as JSON
    daword scan contract.txt --json
")]
    Scan(ScanArgs),

    /// Print a standard clause or insert it into a document
    #[command(after_help = "EXAMPLES:
    # List the available clauses
    daword clause

    # Print a clause
    daword clause confidentiality

    # Append a clause to the end of a document
    daword clause force_majeure --into contract.txt
")]
    Clause(ClauseArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// JSON configuration file
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", value_name = "PORT")]
    pub port: Option<u16>,

    /// Internal docassemble origin (plain HTTP)
    #[arg(long, value_name = "URL")]
    pub origin: Option<String>,

    /// Directory holding manifest.xml and word.js
    #[arg(long, value_name = "DIR")]
    pub assets_dir: Option<PathBuf>,

    /// PEM certificate chain (requires --key)
    #[arg(long, value_name = "FILE", requires = "key")]
    pub cert: Option<PathBuf>,

    /// PEM private key (requires --cert)
    #[arg(long, value_name = "FILE", requires = "cert")]
    pub key: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Plain-text document to scan
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output the variables as JSON instead of a template
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ClauseArgs {
    /// Clause key (omit to list the available clauses)
    #[arg(value_name = "KEY")]
    pub key: Option<String>,

    /// Append the clause to this plain-text document instead of printing it
    #[arg(long, value_name = "FILE", requires = "key")]
    pub into: Option<PathBuf>,
}
