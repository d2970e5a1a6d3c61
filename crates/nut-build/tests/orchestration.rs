//! Settings file to engine calls, without a real engine.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nut_build::{
    collect_entries, select_variants, BuildContext, BuildContextFactory, BuildEngine,
    BuildError, CommandInput, EngineError, EntryLocation, Mode, RunningBuild,
};
use nut_settings::{read_project_settings, SettingsError, SettingsRequest};
use serde_json::json;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingEngine {
    fail: Vec<String>,
    built: Mutex<Vec<(String, serde_json::Value)>>,
}

#[async_trait]
impl BuildEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    async fn build_variant(&self, ctx: &BuildContext) -> Result<(), EngineError> {
        let name = ctx.feature_name().to_string();
        self.built
            .lock()
            .unwrap()
            .push((name.clone(), json!(ctx.defines())));
        if self.fail.contains(&name) {
            return Err(EngineError::VariantFailed {
                feature: name,
                status: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }

    async fn watch(&self, _ctx: Arc<BuildContext>) -> Result<Box<dyn RunningBuild>, EngineError> {
        unimplemented!("not used by these tests")
    }
}

fn project(settings: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src/entries/admin")).unwrap();
    fs::write(dir.path().join("src/entries/main.ts"), "").unwrap();
    fs::write(dir.path().join("src/entries/admin/index.tsx"), "").unwrap();
    fs::write(dir.path().join("nut.toml"), settings).unwrap();
    dir
}

const SETTINGS: &str = r#"
[featureMatrix.stable]
batchSize = 20

[featureMatrix.insiders]
batchSize = 50
preview = true

[featureMatrix.legacy]
polyfills = true

[build]
outDir = "build"
excludeFeatures = ["legacy"]

[build.defines]
apiHost = "api.example.com"
preview = false
"#;

async fn factory(root: &Path, mode: Mode) -> BuildContextFactory {
    let settings = Arc::new(read_project_settings(&SettingsRequest::new(root)).unwrap());
    let entries = collect_entries(&EntryLocation::new(root)).await.unwrap();
    BuildContextFactory::prepare(CommandInput::new(root, mode), settings, entries.into())
        .await
        .unwrap()
}

#[tokio::test]
async fn every_selected_variant_reaches_the_engine() {
    let dir = project(SETTINGS);
    let factory = factory(dir.path(), Mode::Production).await;
    let settings = Arc::clone(factory.settings());

    let variants = select_variants(
        &settings.feature_matrix,
        &settings.build.exclude_features,
        None,
    )
    .unwrap();
    assert_eq!(variants, vec!["insiders", "stable"]);

    let contexts = factory.create_all(&variants).unwrap();
    let engine = RecordingEngine::default();
    engine.build(&contexts).await.unwrap();

    let built = engine.built.into_inner().unwrap();
    assert_eq!(
        built,
        vec![
            (
                "insiders".to_string(),
                json!({"apiHost": "api.example.com", "batchSize": 50, "preview": true})
            ),
            (
                "stable".to_string(),
                json!({"apiHost": "api.example.com", "batchSize": 20, "preview": false})
            ),
        ]
    );

    for ctx in &contexts {
        assert_eq!(ctx.mode(), Mode::Production);
        assert_eq!(ctx.output_path(), dir.path().join("build"));
        let names: Vec<&str> = ctx.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["admin", "main"]);
    }
}

#[tokio::test]
async fn failed_variants_are_reported_together() {
    let dir = project(SETTINGS);
    let factory = factory(dir.path(), Mode::Development).await;
    let contexts = factory
        .create_all(&["insiders".to_string(), "stable".to_string()])
        .unwrap();

    let engine = RecordingEngine {
        fail: vec!["insiders".to_string()],
        ..RecordingEngine::default()
    };
    let err = engine.build(&contexts).await.unwrap_err();

    match err {
        EngineError::BuildFailed { failed, total } => {
            assert_eq!(failed, vec!["insiders"]);
            assert_eq!(total, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(engine.built.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn unmet_requirements_stop_before_any_context() {
    let dir = project(&SETTINGS.replace("[build]\n", "[build]\nrequires = [\"react\"]\n"));
    let settings = Arc::new(read_project_settings(&SettingsRequest::new(dir.path())).unwrap());

    let err = BuildContextFactory::prepare(
        CommandInput::new(dir.path(), Mode::Production),
        settings,
        Arc::from(Vec::new()),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        BuildError::Settings(SettingsError::MissingDependencies(ref names)) if names == &["react"]
    ));
}
