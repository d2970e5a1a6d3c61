//! Project settings for nut.
//!
//! Settings come from a `nut.toml` file or the `nut` field of `package.json`,
//! layered with `NUT_*` environment variables. This crate also owns the checks
//! that run against a loaded project (schema validation, required
//! dependencies) and the watcher that reports settings-file changes.

pub mod dependency;
pub mod dev;
pub mod discovery;
pub mod error;
pub mod project;
pub mod validation;
pub mod watch;

pub use dependency::strict_check_required_dependency;
pub use dev::DevServerSettings;
pub use discovery::{read_project_settings, ConfigDiscovery, SettingsRequest};
pub use error::{Result, SettingsError};
pub use project::{BuildSettings, EngineSettings, FeatureFlags, FeatureMatrix, ProjectSettings};
pub use validation::validate_project_settings;
pub use watch::{SettingsChange, SettingsWatcher};
