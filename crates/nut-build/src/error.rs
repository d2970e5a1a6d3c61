//! Error types for build orchestration.

use std::path::PathBuf;

use nut_settings::SettingsError;
use thiserror::Error;

pub type Result<T, E = BuildError> = std::result::Result<T, E>;

/// Errors raised while shaping build requests.
///
/// Everything here except [`BuildError::Engine`] is detected before the
/// engine is invoked, so no artifacts exist when one is returned.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unknown feature '{name}'\n\nHint: available features are: {}", .available.join(", "))]
    UnknownFeature { name: String, available: Vec<String> },

    #[error("--analyze must be used with --build-target to specify only one target")]
    AnalyzeRequiresSingleTarget,

    #[error("Invalid proxy target '{target}' for '{prefix}': {reason}")]
    InvalidProxyTarget {
        prefix: String,
        target: String,
        reason: String,
    },

    #[error("Failed to create proxy connection agent: {0}")]
    ProxyAgent(String),

    #[error("Entry directory not found: {}\n\nHint: check --src-dir and --entries-dir", .0.display())]
    EntriesNotFound(PathBuf),

    #[error("Invalid build settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by the external build engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Build engine not found: {}\n\nHint: set build.engine.program in nut.toml", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to launch build engine '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Feature '{feature}' failed to build ({status})")]
    VariantFailed { feature: String, status: String },

    #[error("{} of {total} variants failed to build: {}", .failed.len(), .failed.join(", "))]
    BuildFailed { failed: Vec<String>, total: usize },

    #[error("Failed to serialize build context: {0}")]
    Context(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
