//! CLI module for the roster service
//!
//! Provides command-line interface for:
//! - serve: Boot the store and serve HTTP
//! - check: Validate config and seed, print entity counts

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{boot, check, run, run_command, serve};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
