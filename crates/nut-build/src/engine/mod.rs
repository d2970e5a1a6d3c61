//! Boundary to the external build engine.
//!
//! nut never compiles code itself. It hands each [`BuildContext`] to a
//! [`BuildEngine`] chosen by `build.engine` in the project settings.

mod command;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::context::BuildContext;
use crate::error::EngineError;

pub use command::{load_engine, CommandEngine};

/// A build engine adapter.
#[async_trait]
pub trait BuildEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Build one variant to completion.
    async fn build_variant(&self, ctx: &BuildContext) -> Result<(), EngineError>;

    /// Start a continuous build of one variant.
    async fn watch(&self, ctx: Arc<BuildContext>) -> Result<Box<dyn RunningBuild>, EngineError>;

    /// Build every context, one after another.
    ///
    /// A failing variant does not stop the others; all failures are
    /// reported together.
    async fn build(&self, contexts: &[Arc<BuildContext>]) -> Result<(), EngineError> {
        let mut failed = Vec::new();

        for ctx in contexts {
            match self.build_variant(ctx).await {
                Ok(()) => info!(feature = ctx.feature_name(), "variant built"),
                Err(e) => {
                    error!(feature = ctx.feature_name(), "variant failed: {e}");
                    failed.push(ctx.feature_name().to_string());
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(EngineError::BuildFailed {
                failed,
                total: contexts.len(),
            })
        }
    }
}

/// Handle to a continuous build started by [`BuildEngine::watch`].
#[async_trait]
pub trait RunningBuild: Send {
    fn feature_name(&self) -> &str;

    async fn stop(self: Box<Self>) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuildContextFactory, CommandInput, Mode};
    use nut_settings::ProjectSettings;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct RecordingEngine {
        fail: &'static str,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BuildEngine for RecordingEngine {
        fn name(&self) -> &str {
            "recording"
        }

        async fn build_variant(&self, ctx: &BuildContext) -> Result<(), EngineError> {
            self.seen.lock().unwrap().push(ctx.feature_name().to_string());
            if ctx.feature_name() == self.fail {
                return Err(EngineError::VariantFailed {
                    feature: ctx.feature_name().to_string(),
                    status: "exit status: 1".to_string(),
                });
            }
            Ok(())
        }

        async fn watch(
            &self,
            _ctx: Arc<BuildContext>,
        ) -> Result<Box<dyn RunningBuild>, EngineError> {
            unimplemented!("not used in these tests")
        }
    }

    #[tokio::test]
    async fn build_attempts_every_variant() {
        let dir = TempDir::new().unwrap();
        let factory = BuildContextFactory::prepare(
            CommandInput::new(dir.path(), Mode::Production),
            Arc::new(ProjectSettings::default()),
            Arc::from(Vec::new()),
        )
        .await
        .unwrap();
        let contexts = factory
            .create_all(&["dev".to_string(), "stable".to_string()])
            .unwrap();

        let engine = RecordingEngine {
            fail: "dev",
            seen: Mutex::new(Vec::new()),
        };
        let err = engine.build(&contexts).await.unwrap_err();

        assert_eq!(*engine.seen.lock().unwrap(), vec!["dev", "stable"]);
        match err {
            EngineError::BuildFailed { failed, total } => {
                assert_eq!(failed, vec!["dev"]);
                assert_eq!(total, 2);
            }
            other => panic!("expected BuildFailed, got {other:?}"),
        }
    }
}
