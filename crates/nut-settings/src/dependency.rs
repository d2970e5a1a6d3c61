//! Required third-party package check.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SettingsError};
use crate::project::ProjectSettings;

const DEPENDENCY_FIELDS: [&str; 3] = ["dependencies", "devDependencies", "peerDependencies"];

/// Fail unless every package in `build.requires` is declared in `package.json`
/// and installed under `node_modules`.
///
/// All missing packages are reported at once.
pub async fn strict_check_required_dependency(
    settings: &ProjectSettings,
    cwd: &Path,
) -> Result<()> {
    let required = &settings.build.requires;
    if required.is_empty() {
        return Ok(());
    }

    let declared = read_declared_dependencies(cwd).await?;
    let mut missing = Vec::new();
    for name in required {
        let installed = tokio::fs::metadata(cwd.join("node_modules").join(name).join("package.json"))
            .await
            .is_ok();
        let is_declared = declared
            .iter()
            .any(|deps| deps.get(name.as_str()).is_some());

        if !(is_declared && installed) {
            debug!(package = %name, is_declared, installed, "required dependency unmet");
            missing.push(name.clone());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SettingsError::MissingDependencies(missing))
    }
}

async fn read_declared_dependencies(cwd: &Path) -> Result<Vec<Value>> {
    let path = cwd.join("package.json");
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let parsed: Value = serde_json::from_str(&content)
        .map_err(|e| SettingsError::invalid("package.json", format!("Invalid JSON: {e}")))?;

    Ok(DEPENDENCY_FIELDS
        .iter()
        .filter_map(|field| parsed.get(*field).cloned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn settings_requiring(names: &[&str]) -> ProjectSettings {
        let mut settings = ProjectSettings::default();
        settings.build.requires = names.iter().map(|n| n.to_string()).collect();
        settings
    }

    fn install(root: &Path, name: &str) {
        let dir = root.join("node_modules").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), "{}").unwrap();
    }

    #[tokio::test]
    async fn passes_without_requirements() {
        let dir = TempDir::new().unwrap();
        strict_check_required_dependency(&ProjectSettings::default(), dir.path())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn passes_when_declared_and_installed() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"react": "^18"}, "devDependencies": {"core-js": "^3"}}"#,
        )
        .unwrap();
        install(dir.path(), "react");
        install(dir.path(), "core-js");

        strict_check_required_dependency(&settings_requiring(&["react", "core-js"]), dir.path())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reports_every_missing_package() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"react": "^18", "core-js": "^3"}}"#,
        )
        .unwrap();
        install(dir.path(), "react");

        let err = strict_check_required_dependency(
            &settings_requiring(&["react", "core-js", "antd"]),
            dir.path(),
        )
        .await
        .unwrap_err();

        match err {
            SettingsError::MissingDependencies(names) => {
                assert_eq!(names, vec!["core-js", "antd"]);
            }
            other => panic!("expected MissingDependencies, got {other:?}"),
        }
    }
}
