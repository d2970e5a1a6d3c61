//! Integration tests for `nut build`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Project with a three-variant matrix and `sh` as the build engine.
fn project(engine_script: &str, extra_build: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("src/entries")).unwrap();
    fs::write(root.join("src/entries/index.js"), "export default 1;\n").unwrap();
    fs::write(root.join("src/entries/admin.ts"), "export default 2;\n").unwrap();
    fs::write(root.join("engine.sh"), engine_script).unwrap();
    fs::write(
        root.join("nut.toml"),
        format!(
            r#"
[featureMatrix.stable]
batchSize = 20

[featureMatrix.beta]
batchSize = 50

[featureMatrix.legacy]
polyfills = true

[build]
excludeFeatures = ["legacy"]
{extra_build}

[build.engine]
program = "sh"
args = ["engine.sh"]
"#
        ),
    )
    .unwrap();

    dir
}

const RECORDING_ENGINE: &str = r#"echo "$NUT_ENGINE_FEATURE $NUT_ENGINE_MODE $NUT_ENGINE_WATCH" >> built.txt
"#;

fn nut(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nut").unwrap();
    cmd.env("NO_COLOR", "1").arg("build").arg("--cwd").arg(root);
    cmd
}

fn built(root: &Path) -> Vec<String> {
    fs::read_to_string(root.join("built.txt"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn analyze_without_build_target_exits_21() {
    let dir = TempDir::new().unwrap();

    nut(dir.path())
        .arg("--analyze")
        .assert()
        .code(21)
        .stderr(predicate::str::contains("--analyze"));
}

#[test]
fn unknown_feature_only_exits_22() {
    let dir = project(RECORDING_ENGINE, "");

    nut(dir.path())
        .args(["--feature-only", "nightly"])
        .assert()
        .code(22)
        .stderr(predicate::str::contains("nightly"));
    assert!(built(dir.path()).is_empty());
}

#[test]
fn excluded_feature_cannot_be_selected() {
    let dir = project(RECORDING_ENGINE, "");

    nut(dir.path())
        .args(["--feature-only", "legacy"])
        .assert()
        .code(22);
}

#[test]
fn missing_settings_file_exits_22() {
    let dir = TempDir::new().unwrap();

    nut(dir.path())
        .args(["--config", "missing.toml"])
        .assert()
        .code(22);
}

#[test]
fn missing_required_dependency_exits_23() {
    let dir = project(RECORDING_ENGINE, r#"requires = ["left-pad"]"#);
    fs::write(dir.path().join("package.json"), r#"{"dependencies": {}}"#).unwrap();

    nut(dir.path())
        .assert()
        .code(23)
        .stderr(predicate::str::contains("left-pad"));
    assert!(built(dir.path()).is_empty());
}

#[test]
fn builds_every_variant_not_excluded() {
    let dir = project(RECORDING_ENGINE, "");

    nut(dir.path()).assert().success();

    assert_eq!(
        built(dir.path()),
        vec!["beta production false", "stable production false"]
    );
}

#[test]
fn feature_only_builds_one_variant() {
    let dir = project(RECORDING_ENGINE, "");

    nut(dir.path())
        .args(["--feature-only", "stable", "--mode", "development"])
        .assert()
        .success();

    assert_eq!(built(dir.path()), vec!["stable development false"]);
}

#[test]
fn engine_receives_merged_context() {
    let script = r#"printf '%s' "$NUT_ENGINE_CONTEXT" > "context-$NUT_ENGINE_FEATURE.json"
"#;
    let dir = project(script, "");

    nut(dir.path())
        .args(["--build-target", "beta", "-D", "apiHost=\"staging\"", "-d", "out"])
        .assert()
        .success();

    let context: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("context-beta.json")).unwrap())
            .unwrap();
    assert_eq!(context["featureName"], "beta");
    assert_eq!(context["mode"], "production");
    assert_eq!(context["outDir"], "out");
    assert_eq!(context["defines"]["batchSize"], 50);
    assert_eq!(context["defines"]["apiHost"], "staging");
    assert!(!dir.path().join("context-stable.json").exists());
}

#[test]
fn failing_variant_exits_1() {
    let script = r#"[ "$NUT_ENGINE_FEATURE" = "beta" ] && exit 3
echo "$NUT_ENGINE_FEATURE" >> built.txt
"#;
    let dir = project(script, "");

    nut(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("beta"));

    // the other variants still build
    assert_eq!(built(dir.path()), vec!["stable"]);
}

#[test]
fn clean_empties_output_directory() {
    let dir = project(RECORDING_ENGINE, "");
    let stale = dir.path().join("dist/stale.js");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "").unwrap();

    nut(dir.path()).arg("--clean").assert().success();

    assert!(dir.path().join("dist").is_dir());
    assert!(!stale.exists());
}
