//! File-based settings discovery and layered loading.
//!
//! Settings are layered with figment, lowest priority first:
//! serde defaults < settings file < `NUT_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format as _, Json, Serialized, Toml};
use figment::Figment;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SettingsError};
use crate::project::ProjectSettings;

/// Conventional settings file name.
pub const SETTINGS_FILE: &str = "nut.toml";

/// Field of `package.json` that can hold the settings instead of `nut.toml`.
pub const PACKAGE_JSON_FIELD: &str = "nut";

/// Where a command wants its settings from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRequest {
    pub cwd: PathBuf,
    pub specified_file: Option<PathBuf>,
}

impl SettingsRequest {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            specified_file: None,
        }
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.specified_file = file;
        self
    }

    /// The settings file this request reads, or would read once created.
    pub fn settings_path(&self) -> PathBuf {
        match &self.specified_file {
            Some(file) => resolve(&self.cwd, file),
            None => ConfigDiscovery::new(&self.cwd)
                .find()
                .unwrap_or_else(|| self.cwd.join(SETTINGS_FILE)),
        }
    }
}

/// Searches a project root for a settings file.
///
/// # Example
///
/// ```no_run
/// use nut_settings::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// if let Some(path) = discovery.find() {
///     println!("settings at {}", path.display());
/// }
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a settings file in the root directory
    ///
    /// Searches in this order:
    /// 1. TOML settings: nut.toml
    /// 2. package.json (nut field)
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join(SETTINGS_FILE);
        if toml_path.exists() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed
                        .get(PACKAGE_JSON_FIELD)
                        .is_some_and(|field| !field.is_null())
                    {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }
}

/// Read the project settings for a command.
///
/// A file named explicitly in the request must exist. Without one, the
/// project root is searched; a project with no settings file gets defaults.
pub fn read_project_settings(request: &SettingsRequest) -> Result<ProjectSettings> {
    let file = match &request.specified_file {
        Some(file) => {
            let path = resolve(&request.cwd, file);
            if !path.is_file() {
                return Err(SettingsError::NotFound(path));
            }
            Some(path)
        }
        None => ConfigDiscovery::new(&request.cwd).find(),
    };

    let mut figment = Figment::new();
    if let Some(path) = &file {
        figment = figment.merge(file_provider(path)?);
    }
    figment = figment.merge(env_provider());

    let mut settings: ProjectSettings = figment
        .extract()
        .map_err(|e| SettingsError::invalid("settings", e.to_string()))?;
    settings.from = file;

    debug!(
        from = ?settings.from,
        features = settings.feature_matrix.len(),
        "project settings loaded"
    );
    Ok(settings)
}

fn file_provider(path: &Path) -> Result<Figment> {
    if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
        return Ok(Figment::from(Serialized::defaults(package_json_field(
            path,
        )?)));
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Figment::from(Json::file(path))),
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        other => Err(SettingsError::invalid(
            "settings file",
            format!(
                "unsupported settings format '{}' ({}), use nut.toml or package.json",
                other.unwrap_or(""),
                path.display()
            ),
        )),
    }
}

fn package_json_field(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    let parsed: Value = serde_json::from_str(&content)
        .map_err(|e| SettingsError::invalid("package.json", format!("Invalid JSON: {e}")))?;

    match parsed.get(PACKAGE_JSON_FIELD) {
        Some(value) if value.is_object() => Ok(value.clone()),
        _ => Err(SettingsError::invalid(
            PACKAGE_JSON_FIELD,
            "Add a 'nut' object to your package.json",
        )),
    }
}

/// `NUT_DEV_SERVER__PORT=9000` sets `devServer.port`.
fn env_provider() -> Env {
    Env::prefixed("NUT_").split("__").map(|key| {
        key.as_str()
            .split('.')
            .map(snake_to_camel)
            .collect::<Vec<_>>()
            .join(".")
            .into()
    })
}

fn snake_to_camel(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper = false;
    for c in segment.to_lowercase().chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
