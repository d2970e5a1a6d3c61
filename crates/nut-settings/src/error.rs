//! Error types for settings loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid settings value for '{field}'{}", .hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default())]
    InvalidValue { field: String, hint: Option<String> },

    #[error("unknown feature '{name}' in {field}")]
    UnknownFeature { field: String, name: String },

    #[error("missing required dependencies: {}", .0.join(", "))]
    MissingDependencies(Vec<String>),

    #[error("settings watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SettingsError {
    pub(crate) fn invalid(field: impl Into<String>, hint: impl Into<String>) -> Self {
        SettingsError::InvalidValue {
            field: field.into(),
            hint: Some(hint.into()),
        }
    }
}
