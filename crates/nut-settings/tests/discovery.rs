//! Tests for settings file discovery and layered loading.

use nut_settings::{read_project_settings, SettingsError, SettingsRequest};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn project_without_settings_file_gets_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = read_project_settings(&SettingsRequest::new(dir.path())).unwrap();

    assert!(settings.from.is_none());
    assert!(settings.feature_matrix.contains_key("stable"));
    assert!(settings.feature_matrix.contains_key("dev"));
    assert_eq!(settings.dev_server.port, 8788);
}

#[test]
fn reads_nut_toml() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("nut.toml"),
        r#"
[featureMatrix.stable]
batchSize = 20

[featureMatrix.insiders]
batchSize = 50
newLayout = true

[build]
excludeFeatures = ["insiders"]
outDir = "output"

[devServer]
apiPrefixes = ["/api"]
defaultProxyDomain = "api.example.com"
"#,
    )
    .unwrap();

    let settings = read_project_settings(&SettingsRequest::new(dir.path())).unwrap();

    assert_eq!(settings.from, Some(dir.path().join("nut.toml")));
    let names: Vec<_> = settings.feature_matrix.keys().cloned().collect();
    assert_eq!(names, vec!["insiders", "stable"]);
    assert_eq!(settings.feature_matrix["insiders"]["newLayout"], json!(true));
    assert_eq!(settings.feature_matrix["stable"]["batchSize"], json!(20));
    assert_eq!(settings.build.exclude_features, vec!["insiders"]);
    assert_eq!(settings.build.out_dir, PathBuf::from("output"));
    assert_eq!(settings.dev_server.api_prefixes, vec!["/api"]);
}

#[test]
fn reads_package_json_field() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{
  "name": "app",
  "nut": {
    "featureMatrix": {"stable": {}},
    "devServer": {"port": 9000}
  }
}"#,
    )
    .unwrap();

    let settings = read_project_settings(&SettingsRequest::new(dir.path())).unwrap();
    assert_eq!(settings.dev_server.port, 9000);
    assert_eq!(settings.feature_matrix.len(), 1);
}

#[test]
fn specified_file_must_exist() {
    let dir = TempDir::new().unwrap();
    let request =
        SettingsRequest::new(dir.path()).with_file(Some(PathBuf::from("custom.toml")));

    match read_project_settings(&request) {
        Err(SettingsError::NotFound(path)) => assert!(path.ends_with("custom.toml")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn specified_file_wins_over_discovery() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("nut.toml"), "[devServer]\nport = 1111\n").unwrap();
    fs::write(dir.path().join("alt.toml"), "[devServer]\nport = 2222\n").unwrap();

    let request = SettingsRequest::new(dir.path()).with_file(Some(PathBuf::from("alt.toml")));
    let settings = read_project_settings(&request).unwrap();
    assert_eq!(settings.dev_server.port, 2222);
}

#[test]
fn malformed_values_are_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("nut.toml"), "[devServer]\nport = \"not a port\"\n").unwrap();

    let result = read_project_settings(&SettingsRequest::new(dir.path()));
    assert!(matches!(result, Err(SettingsError::InvalidValue { .. })));
}
