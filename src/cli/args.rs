//! CLI argument definitions using clap
//!
//! Commands:
//! - roster serve [--config <path>] [--port <port>]
//! - roster check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Roster - schools, teachers, classes and students over HTTP
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate configuration and seed data, then exit
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./roster.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
