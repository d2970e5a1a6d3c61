//! Top-level project settings.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dev::DevServerSettings;

/// Build-time flags of one variant, keyed by flag name.
pub type FeatureFlags = BTreeMap<String, Value>;

/// Declared variants, keyed by variant name.
pub type FeatureMatrix = BTreeMap<String, FeatureFlags>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// File the settings were read from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PathBuf>,

    #[serde(default = "default_feature_matrix")]
    pub feature_matrix: FeatureMatrix,

    #[serde(default)]
    pub build: BuildSettings,

    #[serde(default)]
    pub dev_server: DevServerSettings,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            from: None,
            feature_matrix: default_feature_matrix(),
            build: BuildSettings::default(),
            dev_server: DevServerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSettings {
    #[serde(default = "default_public_path")]
    pub public_path: String,

    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default = "default_true")]
    pub source_maps: bool,

    /// Project-wide flag values, overridden per variant by the feature matrix.
    #[serde(default)]
    pub defines: FeatureFlags,

    /// Variants never built by `nut build`.
    #[serde(default)]
    pub exclude_features: Vec<String>,

    /// Packages that must be declared and installed before any build starts.
    #[serde(default)]
    pub requires: Vec<String>,

    #[serde(default)]
    pub engine: EngineSettings,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            public_path: default_public_path(),
            out_dir: default_out_dir(),
            source_maps: true,
            defines: FeatureFlags::new(),
            exclude_features: Vec::new(),
            requires: Vec::new(),
            engine: EngineSettings::default(),
        }
    }
}

/// External build engine invoked for every build context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    #[serde(default = "default_engine_program")]
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            program: default_engine_program(),
            args: Vec::new(),
        }
    }
}

fn default_feature_matrix() -> FeatureMatrix {
    let mut matrix = FeatureMatrix::new();
    matrix.insert("stable".to_string(), FeatureFlags::new());
    matrix.insert("dev".to_string(), FeatureFlags::new());
    matrix
}

fn default_public_path() -> String {
    "/".into()
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_engine_program() -> String {
    "nut-engine".into()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_declare_stable_and_dev() {
        let settings = ProjectSettings::default();
        let names: Vec<_> = settings.feature_matrix.keys().cloned().collect();
        assert_eq!(names, vec!["dev", "stable"]);
        assert_eq!(settings.build.out_dir, PathBuf::from("dist"));
        assert_eq!(settings.build.engine.program, "nut-engine");
    }

    #[test]
    fn deserializes_camel_case_keys() {
        let settings: ProjectSettings = serde_json::from_value(json!({
            "featureMatrix": {"insiders": {"newLayout": true}},
            "build": {"excludeFeatures": ["insiders"], "publicPath": "/static/"}
        }))
        .unwrap();

        assert_eq!(settings.feature_matrix["insiders"]["newLayout"], json!(true));
        assert_eq!(settings.build.exclude_features, vec!["insiders"]);
        assert_eq!(settings.build.public_path, "/static/");
        assert!(settings.build.source_maps);
    }
}
