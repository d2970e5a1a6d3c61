//! One dev server instance per start: fresh settings, a watching engine and
//! an HTTP server in front of its output.

use crate::cli::DevArgs;
use crate::commands::utils;
use crate::dev::server::{DevServer, ServerConfig, ServerHandle};
use crate::error::{CliError, Result};
use crate::ui;
use async_trait::async_trait;
use nut_build::{
    collect_entries, construct_proxy_rules, load_engine, BoxError, BuildContextFactory,
    CommandInput, EntryLocation, ProxyOptions, RunningBuild, RunningServer, ServerLauncher,
};
use nut_settings::SettingsRequest;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Starts dev server instances for `nut dev`.
///
/// Settings are re-read on every launch, so a restart picks up whatever
/// changed on disk.
pub struct DevLauncher {
    args: DevArgs,
    cwd: PathBuf,
}

impl DevLauncher {
    pub fn new(args: DevArgs, cwd: PathBuf) -> Self {
        Self { args, cwd }
    }

    pub fn settings_request(&self) -> SettingsRequest {
        SettingsRequest::new(&self.cwd).with_file(self.args.config.clone())
    }

    async fn start(&self) -> Result<RunningDevServer> {
        let settings = utils::load_settings(&self.settings_request())?;
        let dev = &settings.dev_server;
        let variant = self
            .args
            .build_target
            .clone()
            .unwrap_or_else(|| dev.default_feature.clone());

        let location = EntryLocation {
            src_directory: self.args.src_dir.clone(),
            entry_directory: self.args.entries_dir.clone(),
            only: Some(vec![self.args.entry.clone()]),
            ..EntryLocation::new(&self.cwd)
        };
        let (engine, entries) = tokio::try_join!(
            async {
                load_engine(&settings.build.engine, &self.cwd)
                    .await
                    .map_err(CliError::from)
            },
            async { collect_entries(&location).await.map_err(CliError::from) },
        )?;

        let input = CommandInput {
            src_directory: self.args.src_dir.clone(),
            build_target: Some(variant.clone()),
            ..CommandInput::new(&self.cwd, self.args.mode.into())
        };
        let factory =
            BuildContextFactory::prepare(input, Arc::clone(&settings), entries.into()).await?;
        let ctx = factory.create(&variant)?;
        let rules = construct_proxy_rules(&ProxyOptions::from(dev))?;

        let config = ServerConfig {
            host: self.args.host.clone().unwrap_or_else(|| dev.host.clone()),
            port: self.args.port.unwrap_or(dev.port),
            static_root: ctx.output_path(),
            rules: rules.into(),
            cors: dev.cors,
            headers: dev.headers.clone(),
        };
        let server_url = config.server_url();

        let build = engine.watch(ctx).await?;
        let server = match DevServer::new(config).start().await {
            Ok(server) => server,
            Err(e) => {
                // The engine is already running; don't leave it behind
                let _ = build.stop().await;
                return Err(e);
            }
        };

        info!(feature = %variant, entry = %self.args.entry, "dev server started");
        ui::success(&format!("Serving `{}` at {}", variant, server_url));
        Ok(RunningDevServer { server, build })
    }
}

#[async_trait]
impl ServerLauncher for DevLauncher {
    async fn launch(&self) -> std::result::Result<Box<dyn RunningServer>, BoxError> {
        let running = self.start().await?;
        Ok(Box::new(running))
    }
}

/// A live dev server and the engine watch feeding it.
pub struct RunningDevServer {
    server: ServerHandle,
    build: Box<dyn RunningBuild>,
}

#[async_trait]
impl RunningServer for RunningDevServer {
    async fn stop(self: Box<Self>) -> std::result::Result<(), BoxError> {
        let Self { server, build } = *self;
        debug!(feature = build.feature_name(), "stopping dev server");

        let served = server.shutdown().await;
        build.stop().await?;
        served?;
        Ok(())
    }
}
