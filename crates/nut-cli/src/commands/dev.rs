//! Development server command implementation.
//!
//! Orchestrates the dev server lifecycle:
//! - Settings file watching with debouncing
//! - Supervised (re)starts of server and engine watch
//! - Graceful shutdown on Ctrl+C

use crate::cli::DevArgs;
use crate::commands::utils;
use crate::dev::DevLauncher;
use crate::error::Result;
use crate::ui;
use nut_build::{DevServerSupervisor, Phase};
use nut_settings::SettingsWatcher;
use tokio::signal;

/// Execute the dev command.
///
/// # Process Flow
///
/// 1. Resolve the project root and the settings file to watch
/// 2. Start the settings watcher
/// 3. Hand a [`DevLauncher`] to the supervisor, which starts the server and
///    restarts it whenever the settings change
/// 4. On Ctrl+C, stop the running instance and return
///
/// A failed start is reported and retried on the next settings change, so
/// only setup errors before the supervisor runs are returned.
pub async fn execute(args: DevArgs) -> Result<()> {
    ui::info("Starting development server...");

    let cwd = utils::resolve_cwd(args.cwd.as_deref())?;
    let launcher = DevLauncher::new(args, cwd.clone());
    let request = launcher.settings_request();

    let (watcher, changes) = SettingsWatcher::for_request(&request)?;
    ui::info(&format!("Working directory: {}", cwd.display()));
    ui::info(&format!("Watching settings: {}", watcher.path().display()));

    let supervisor = DevServerSupervisor::new(launcher);
    let mut phases = supervisor.subscribe();
    let reporter = tokio::spawn(async move {
        let mut previous = *phases.borrow_and_update();
        while phases.changed().await.is_ok() {
            let phase = *phases.borrow_and_update();
            match (previous, phase) {
                (Phase::Running, Phase::Restarting) => {
                    ui::warning("Settings changed, restarting dev server");
                }
                (Phase::Starting | Phase::Restarting, Phase::Idle) => {
                    ui::error("Dev server failed to start, waiting for a settings change");
                }
                _ => {}
            }
            previous = phase;
        }
    });

    ui::info("Press Ctrl+C to stop");
    supervisor
        .run(changes, async {
            let _ = signal::ctrl_c().await;
        })
        .await;

    drop(watcher);
    reporter.abort();
    ui::success("Development server stopped");
    Ok(())
}
