//! Development server module.
//!
//! - [`server`] serves one variant's output and proxies API prefixes
//! - [`launcher`] builds a fresh instance for every (re)start

pub mod launcher;
pub mod server;

pub use launcher::{DevLauncher, RunningDevServer};
pub use server::{DevServer, ServerConfig, ServerHandle};
