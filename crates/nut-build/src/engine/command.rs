use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use nut_settings::EngineSettings;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::{BuildEngine, RunningBuild};
use crate::context::BuildContext;
use crate::error::EngineError;

/// Serialized [`BuildContext`] JSON.
pub const CONTEXT_ENV: &str = "NUT_ENGINE_CONTEXT";
pub const FEATURE_ENV: &str = "NUT_ENGINE_FEATURE";
pub const MODE_ENV: &str = "NUT_ENGINE_MODE";
/// `"true"` for continuous builds.
pub const WATCH_ENV: &str = "NUT_ENGINE_WATCH";

/// Engine that runs an external program once per variant.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command(&self, ctx: &BuildContext, watch: bool) -> Result<Command, EngineError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(ctx.cwd())
            .env(CONTEXT_ENV, ctx.to_json()?)
            .env(FEATURE_ENV, ctx.feature_name())
            .env(MODE_ENV, ctx.mode().as_str())
            .env(WATCH_ENV, if watch { "true" } else { "false" })
            .stdin(Stdio::null())
            .kill_on_drop(true);
        Ok(cmd)
    }

    fn spawn(&self, ctx: &BuildContext, watch: bool) -> Result<Child, EngineError> {
        debug!(
            program = %self.program.display(),
            feature = ctx.feature_name(),
            watch,
            "launching build engine"
        );
        self.command(ctx, watch)?
            .spawn()
            .map_err(|source| EngineError::Launch {
                program: self.program.display().to_string(),
                source,
            })
    }
}

#[async_trait]
impl BuildEngine for CommandEngine {
    fn name(&self) -> &str {
        self.program
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("engine")
    }

    async fn build_variant(&self, ctx: &BuildContext) -> Result<(), EngineError> {
        let status = self.spawn(ctx, false)?.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(EngineError::VariantFailed {
                feature: ctx.feature_name().to_string(),
                status: status.to_string(),
            })
        }
    }

    async fn watch(&self, ctx: Arc<BuildContext>) -> Result<Box<dyn RunningBuild>, EngineError> {
        let child = self.spawn(&ctx, true)?;
        info!(feature = ctx.feature_name(), "watching");
        Ok(Box::new(WatchProcess { child, ctx }))
    }
}

struct WatchProcess {
    child: Child,
    ctx: Arc<BuildContext>,
}

#[async_trait]
impl RunningBuild for WatchProcess {
    fn feature_name(&self) -> &str {
        self.ctx.feature_name()
    }

    async fn stop(mut self: Box<Self>) -> Result<(), EngineError> {
        if let Some(status) = self.child.try_wait()? {
            warn!(
                feature = self.ctx.feature_name(),
                "build engine exited early ({status})"
            );
            return Ok(());
        }
        self.child.kill().await?;
        debug!(feature = self.ctx.feature_name(), "build engine stopped");
        Ok(())
    }
}

/// Bind the engine adapter named by the project settings.
///
/// A program given as a path is resolved against `cwd` and must exist; a
/// bare name is looked up on `PATH` when launched.
pub async fn load_engine(
    settings: &EngineSettings,
    cwd: &Path,
) -> Result<Arc<dyn BuildEngine>, EngineError> {
    let program = PathBuf::from(&settings.program);
    let program = if program.components().count() > 1 || program.is_absolute() {
        let resolved = if program.is_absolute() {
            program
        } else {
            cwd.join(program)
        };
        if tokio::fs::metadata(&resolved).await.is_err() {
            return Err(EngineError::NotFound(resolved));
        }
        resolved
    } else {
        program
    };

    debug!(program = %program.display(), "build engine bound");
    Ok(Arc::new(CommandEngine::new(program, settings.args.clone())))
}
