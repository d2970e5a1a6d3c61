//! Shared utilities for command implementations.
//!
//! - Working directory and path resolution
//! - Settings loading and validation
//! - Output directory cleaning

use crate::error::{CliError, Result};
use nut_settings::{read_project_settings, validate_project_settings, ProjectSettings, SettingsRequest};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolve a path relative to a working directory.
///
/// If the path is absolute, returns it unchanged. Otherwise, joins it with
/// the working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Project root for a command: `--cwd` resolved against the process
/// directory, or the process directory itself.
///
/// # Errors
///
/// Returns `InvalidArgument` if an explicit `--cwd` is not a directory.
pub fn resolve_cwd(explicit: Option<&Path>) -> Result<PathBuf> {
    let current = get_cwd()?;
    let Some(explicit) = explicit else {
        return Ok(current);
    };

    let cwd = resolve_path(explicit, &current);
    if !cwd.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "--cwd is not a directory: {}",
            cwd.display()
        )));
    }
    Ok(cwd)
}

/// Get the current working directory.
///
/// # Errors
///
/// Returns I/O error if current directory cannot be determined.
pub fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| {
        CliError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to get current directory: {}", e),
        ))
    })
}

/// Read and validate the project settings a request points at.
pub fn load_settings(request: &SettingsRequest) -> Result<Arc<ProjectSettings>> {
    let settings = read_project_settings(request)?;
    validate_project_settings(&settings)?;
    Ok(Arc::new(settings))
}

/// Clean an output directory by removing all its contents.
///
/// Creates the directory if it doesn't exist. If it exists, removes all files
/// and subdirectories within it.
///
/// # Errors
///
/// Returns `InvalidArgument` if the path exists but is not a directory, and
/// I/O errors if directory operations fail.
pub fn clean_output_dir(out_dir: &Path) -> Result<()> {
    if out_dir.exists() {
        if !out_dir.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "Output path exists but is not a directory: {}",
                out_dir.display()
            )));
        }

        // Keep the directory itself so a running static server keeps its root
        for entry in fs::read_dir(out_dir)? {
            let path = entry?.path();

            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
    } else {
        fs::create_dir_all(out_dir)?;
    }

    Ok(())
}
