//! nut CLI - feature-matrix builds and a self-restarting dev server.
//!
//! The CLI is a thin shell over `nut-settings` and `nut-build`:
//!
//! - [`cli`] - Argument definitions (clap derive)
//! - [`commands`] - `build` and `dev` implementations
//! - [`dev`] - Dev server and the launcher the supervisor restarts
//! - [`error`] - CLI errors, exit codes and miette reports
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal output helpers
//!
//! # Example
//!
//! ```rust
//! use nut_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     // CLI command implementations...
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
