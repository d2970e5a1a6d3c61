//! Error handling for the nut CLI.
//!
//! Library crates report failures through their own `thiserror` enums
//! ([`SettingsError`], [`BuildError`], [`EngineError`]); this module folds them
//! into [`CliError`] and decides the process exit code for each.
//!
//! # Exit codes
//!
//! | code | meaning |
//! |------|---------|
//! | 1    | build, server or I/O failure |
//! | 21   | `--analyze` without `--build-target` |
//! | 22   | invalid configuration (settings, unknown feature, bad arguments) |
//! | 23   | required dependency missing |
//! | 99   | the command task panicked or was aborted |

use nut_build::{BuildError, EngineError};
use nut_settings::SettingsError;
use thiserror::Error;

mod diagnostic;

pub use diagnostic::cli_error_to_miette;

pub mod exit_code {
    pub const FAILURE: i32 = 1;
    pub const ANALYZE_WITHOUT_TARGET: i32 = 21;
    pub const CONFIGURATION: i32 = 22;
    pub const MISSING_DEPENDENCY: i32 = 23;
    pub const UNEXPECTED: i32 = 99;
}

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings could not be read or failed validation
    #[error("Configuration error: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Build failed: {0}")]
    Engine(#[from] EngineError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// The command task panicked or was cancelled
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Settings(e) => settings_exit_code(e),
            CliError::Build(e) => match e {
                BuildError::AnalyzeRequiresSingleTarget => exit_code::ANALYZE_WITHOUT_TARGET,
                BuildError::UnknownFeature { .. }
                | BuildError::InvalidProxyTarget { .. }
                | BuildError::EntriesNotFound(_)
                | BuildError::InvalidSettings(_) => exit_code::CONFIGURATION,
                BuildError::Settings(e) => settings_exit_code(e),
                BuildError::Engine(EngineError::NotFound(_)) => exit_code::CONFIGURATION,
                BuildError::Engine(_) | BuildError::ProxyAgent(_) | BuildError::Io(_) => {
                    exit_code::FAILURE
                }
            },
            CliError::Engine(EngineError::NotFound(_)) => exit_code::CONFIGURATION,
            CliError::InvalidArgument(_) => exit_code::CONFIGURATION,
            CliError::Engine(_) | CliError::Io(_) | CliError::Server(_) => exit_code::FAILURE,
            CliError::Unexpected(_) => exit_code::UNEXPECTED,
        }
    }
}

fn settings_exit_code(err: &SettingsError) -> i32 {
    match err {
        SettingsError::MissingDependencies(_) => exit_code::MISSING_DEPENDENCY,
        SettingsError::Io(_) | SettingsError::Watch(_) => exit_code::FAILURE,
        _ => exit_code::CONFIGURATION,
    }
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
