//! Build context construction.
//!
//! A [`BuildContext`] is the frozen description of one variant build. The
//! factory merges three layers, lowest priority first:
//!
//! 1. project base settings (`build.*`)
//! 2. the variant's feature flags, merged over `build.defines`
//! 3. command-line overrides
//!
//! Scalar options go through figment. Flags are merged per key: a higher
//! layer replaces a value outright, objects included.
//!
//! Contexts are handed out behind `Arc` and expose getters only.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use figment::providers::Serialized;
use figment::Figment;
use nut_settings::{strict_check_required_dependency, FeatureFlags, ProjectSettings};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entries::EntryDescriptor;
use crate::error::{BuildError, Result};
use crate::matrix::resolve_feature_names;

/// Build mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings the command line may override. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_maps: Option<bool>,

    /// Merged by key over the variant's flags, outside figment.
    #[serde(skip)]
    pub defines: FeatureFlags,
}

/// Invocation parameters shared by every context of one command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInput {
    pub cwd: PathBuf,
    pub mode: Mode,
    pub src_directory: PathBuf,
    pub clean: bool,
    pub analyze: bool,
    pub build_target: Option<String>,
    pub overrides: BuildOverrides,
}

impl CommandInput {
    pub fn new(cwd: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            cwd: cwd.into(),
            mode,
            src_directory: PathBuf::from("src"),
            clean: false,
            analyze: false,
            build_target: None,
            overrides: BuildOverrides::default(),
        }
    }
}

/// Reject flag combinations that cannot be honoured.
///
/// Analysis output only makes sense for a single variant, so `--analyze`
/// needs `--build-target`.
pub fn check_command_flags(analyze: bool, build_target: Option<&str>) -> Result<()> {
    if analyze && build_target.is_none() {
        return Err(BuildError::AnalyzeRequiresSingleTarget);
    }
    Ok(())
}

/// Options after the three layers are merged.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedOptions {
    public_path: String,
    out_dir: PathBuf,
    source_maps: bool,
}

/// Flags from every layer, a later layer replacing whole values by key.
fn merge_defines<'a>(layers: impl IntoIterator<Item = &'a FeatureFlags>) -> FeatureFlags {
    let mut merged = FeatureFlags::new();
    for layer in layers {
        merged.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}

/// Immutable descriptor of one variant build.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildContext {
    feature_name: String,
    mode: Mode,
    cwd: PathBuf,
    src_directory: PathBuf,
    public_path: String,
    out_dir: PathBuf,
    source_maps: bool,
    defines: FeatureFlags,
    entries: Arc<[EntryDescriptor]>,
    clean: bool,
    analyze: bool,
    build_time: DateTime<Utc>,
    settings: Arc<ProjectSettings>,
}

impl BuildContext {
    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn src_directory(&self) -> &Path {
        &self.src_directory
    }

    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    /// Output directory, relative to [`cwd`](Self::cwd) unless absolute.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Output directory resolved against the working directory.
    pub fn output_path(&self) -> PathBuf {
        self.cwd.join(&self.out_dir)
    }

    pub fn source_maps(&self) -> bool {
        self.source_maps
    }

    /// Merged flag values: `build.defines`, then variant flags, then `--define`.
    pub fn defines(&self) -> &FeatureFlags {
        &self.defines
    }

    pub fn entries(&self) -> &[EntryDescriptor] {
        &self.entries
    }

    pub fn clean(&self) -> bool {
        self.clean
    }

    pub fn analyze(&self) -> bool {
        self.analyze
    }

    pub fn build_time(&self) -> DateTime<Utc> {
        self.build_time
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    /// JSON handed to the external engine.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Produces [`BuildContext`]s for one command.
///
/// Constructed through [`prepare`](Self::prepare), which runs the checks
/// that must pass before any context exists.
#[derive(Debug)]
pub struct BuildContextFactory {
    cmd: CommandInput,
    settings: Arc<ProjectSettings>,
    entries: Arc<[EntryDescriptor]>,
}

impl BuildContextFactory {
    /// Check the command flags and the project's required dependencies, once.
    pub async fn prepare(
        cmd: CommandInput,
        settings: Arc<ProjectSettings>,
        entries: Arc<[EntryDescriptor]>,
    ) -> Result<Self> {
        check_command_flags(cmd.analyze, cmd.build_target.as_deref())?;
        strict_check_required_dependency(&settings, &cmd.cwd).await?;

        Ok(Self {
            cmd,
            settings,
            entries,
        })
    }

    pub fn settings(&self) -> &Arc<ProjectSettings> {
        &self.settings
    }

    /// Context for one variant of the feature matrix.
    pub fn create(&self, variant: &str) -> Result<Arc<BuildContext>> {
        let flags = self.settings.feature_matrix.get(variant).ok_or_else(|| {
            BuildError::UnknownFeature {
                name: variant.to_string(),
                available: resolve_feature_names(&self.settings.feature_matrix, &[]),
            }
        })?;

        let build = &self.settings.build;
        let base = ResolvedOptions {
            public_path: build.public_path.clone(),
            out_dir: build.out_dir.clone(),
            source_maps: build.source_maps,
        };

        let resolved: ResolvedOptions = Figment::from(Serialized::defaults(base))
            .merge(Serialized::defaults(&self.cmd.overrides))
            .extract()
            .map_err(|e| BuildError::InvalidSettings(e.to_string()))?;
        let defines = merge_defines([&build.defines, flags, &self.cmd.overrides.defines]);

        debug!(
            feature = variant,
            out_dir = %resolved.out_dir.display(),
            defines = defines.len(),
            "build context created"
        );

        Ok(Arc::new(BuildContext {
            feature_name: variant.to_string(),
            mode: self.cmd.mode,
            cwd: self.cmd.cwd.clone(),
            src_directory: self.cmd.src_directory.clone(),
            public_path: resolved.public_path,
            out_dir: resolved.out_dir,
            source_maps: resolved.source_maps,
            defines,
            entries: Arc::clone(&self.entries),
            clean: self.cmd.clean,
            analyze: self.cmd.analyze,
            build_time: Utc::now(),
            settings: Arc::clone(&self.settings),
        }))
    }

    /// Contexts for every variant, or none if any one fails.
    pub fn create_all(&self, variants: &[String]) -> Result<Vec<Arc<BuildContext>>> {
        variants.iter().map(|name| self.create(name)).collect()
    }
}
