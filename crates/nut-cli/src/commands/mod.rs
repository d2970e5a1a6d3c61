//! Command implementations for the nut CLI.
//!
//! - [`build`] - Build every variant of the feature matrix, or watch one
//! - [`dev`] - Development server that restarts on settings changes
//!
//! Each command module provides an `execute` function that takes the parsed
//! command arguments and returns a Result.

pub mod build;
pub mod dev;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use dev::execute as dev_execute;

use crate::cli::Command;
use crate::error::Result;

/// Dispatch a parsed subcommand.
pub async fn execute(command: Command) -> Result<()> {
    match command {
        Command::Build(args) => build_execute(args).await,
        Command::Dev(args) => dev_execute(args).await,
    }
}
