//! Dev server supervisor.
//!
//! Keeps one dev server alive and restarts it when the project settings
//! change. A single control loop owns the current server; starts and stops
//! run as one in-flight operation at a time, and change notifications that
//! arrive meanwhile are folded into one pending restart by the
//! [`RestartMachine`].
//!
//! A failed start is logged and leaves the supervisor idle until the next
//! change.

mod machine;

use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use nut_settings::SettingsChange;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

pub use machine::{Effect, Event, Phase, RestartMachine};

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Starts one server instance from freshly loaded settings.
#[async_trait]
pub trait ServerLauncher: Send + Sync + 'static {
    async fn launch(&self) -> Result<Box<dyn RunningServer>, BoxError>;
}

/// A live server instance.
#[async_trait]
pub trait RunningServer: Send {
    /// Stop the instance and release everything it holds.
    async fn stop(self: Box<Self>) -> Result<(), BoxError>;
}

type Operation = Pin<Box<dyn Future<Output = Outcome> + Send>>;

enum Outcome {
    Started(Box<dyn RunningServer>),
    StartFailed(BoxError),
    TornDown,
}

pub struct DevServerSupervisor<L> {
    launcher: Arc<L>,
    machine: RestartMachine,
    current: Option<Box<dyn RunningServer>>,
    phase_tx: watch::Sender<Phase>,
}

impl<L: ServerLauncher> DevServerSupervisor<L> {
    pub fn new(launcher: L) -> Self {
        let (phase_tx, _) = watch::channel(Phase::Idle);
        Self {
            launcher: Arc::new(launcher),
            machine: RestartMachine::new(),
            current: None,
            phase_tx,
        }
    }

    /// Observe phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// Start the server and keep it in step with `changes` until `shutdown`
    /// resolves. Returns once the last instance has stopped.
    pub async fn run<S>(mut self, mut changes: mpsc::Receiver<SettingsChange>, shutdown: S)
    where
        S: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);

        let mut in_flight = self.apply(Event::Launch).await;
        let mut shutdown_seen = false;
        let mut changes_open = true;

        while !(self.machine.phase() == Phase::Stopped && in_flight.is_none()) {
            let event = tokio::select! {
                biased;

                _ = &mut shutdown, if !shutdown_seen => {
                    shutdown_seen = true;
                    info!("shutting down dev server");
                    Event::Shutdown
                }

                change = changes.recv(), if changes_open => match change {
                    Some(change) => {
                        info!(path = %change.path.display(), "settings changed, restarting dev server");
                        Event::ConfigChanged
                    }
                    None => {
                        debug!("settings watcher closed");
                        changes_open = false;
                        continue;
                    }
                },

                outcome = settle(&mut in_flight) => {
                    in_flight = None;
                    match outcome {
                        Outcome::Started(server) => {
                            self.current = Some(server);
                            Event::Started
                        }
                        Outcome::StartFailed(e) => {
                            error!("dev server failed to start: {e}");
                            Event::StartFailed
                        }
                        Outcome::TornDown => Event::TornDown,
                    }
                }
            };

            if let Some(op) = self.apply(event).await {
                in_flight = Some(op);
            }
        }

        debug!("dev server supervisor stopped");
    }

    /// Step the machine and turn its effect into an operation.
    ///
    /// A stop that ends the session is awaited here, so `run` only returns
    /// after the last instance is gone.
    async fn apply(&mut self, event: Event) -> Option<Operation> {
        let (machine, effect) = self.machine.step(event);
        self.machine = machine;
        self.phase_tx.send_replace(machine.phase());
        debug!(?event, phase = ?machine.phase(), ?effect, "supervisor step");

        match effect? {
            Effect::Start => {
                let launcher = Arc::clone(&self.launcher);
                Some(Box::pin(async move {
                    match launcher.launch().await {
                        Ok(server) => Outcome::Started(server),
                        Err(e) => Outcome::StartFailed(e),
                    }
                }))
            }
            Effect::Stop => {
                let server = self.current.take();
                if machine.phase() == Phase::Stopped {
                    if let Some(server) = server {
                        stop_server(server).await;
                    }
                    None
                } else {
                    Some(Box::pin(async move {
                        if let Some(server) = server {
                            stop_server(server).await;
                        }
                        Outcome::TornDown
                    }))
                }
            }
        }
    }
}

async fn stop_server(server: Box<dyn RunningServer>) {
    if let Err(e) = server.stop().await {
        warn!("dev server did not stop cleanly: {e}");
    }
}

async fn settle(in_flight: &mut Option<Operation>) -> Outcome {
    match in_flight {
        Some(op) => op.await,
        None => std::future::pending().await,
    }
}
