//! Command-line interface definition for nut.
//!
//! # Command Structure
//!
//! - `nut build` - Build every variant of the feature matrix, or watch one
//! - `nut dev` - Development server that restarts when the settings change

mod commands;
pub mod enums;
mod validation;

use clap::Parser;

pub use commands::{BuildArgs, Command, DevArgs};
pub use enums::*;
pub use validation::parse_define;

/// nut - feature-matrix builds for front-end projects
#[derive(Parser, Debug)]
#[command(
    name = "nut",
    version,
    about = "Feature-matrix builds and a self-restarting dev server",
    long_about = "nut builds one output per variant of a project's feature matrix and runs\n\
                  a development server that restarts itself whenever the project settings change.\n\
                  Compilation is delegated to the build engine configured in nut.toml."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    ///
    /// Only critical errors will be displayed. Useful for CI/CD environments
    /// or when piping output to other tools.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
