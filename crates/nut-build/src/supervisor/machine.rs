//! Restart state machine.
//!
//! Pure transitions: the machine never performs I/O, it only says which
//! [`Effect`] the supervisor loop must carry out next. At most one start or
//! stop is in flight at a time; changes that arrive meanwhile collapse into a
//! single pending restart.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No server, nothing in flight.
    Idle,
    /// A launch is in flight.
    Starting,
    Running,
    /// The old server is being stopped; a launch follows.
    Restarting,
    /// Terminal.
    Stopped,
}

impl Phase {
    fn is_busy(self) -> bool {
        matches!(self, Phase::Starting | Phase::Restarting)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// First start requested by the supervisor itself.
    Launch,
    /// The settings changed.
    ConfigChanged,
    Started,
    StartFailed,
    /// The previous server finished stopping.
    TornDown,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Launch a new server.
    Start,
    /// Stop the current server.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartMachine {
    phase: Phase,
    pending_restart: bool,
    shutdown_requested: bool,
}

impl Default for RestartMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RestartMachine {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            pending_restart: false,
            shutdown_requested: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending_restart(&self) -> bool {
        self.pending_restart
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    fn to(self, phase: Phase) -> Self {
        Self { phase, ..self }
    }

    /// Apply one event.
    pub fn step(self, event: Event) -> (Self, Option<Effect>) {
        use Effect::{Start, Stop};
        use Event::*;

        let phase = self.phase;
        match (phase, event) {
            (Phase::Stopped, _) => (self, None),

            (Phase::Idle, Shutdown) => (self.to(Phase::Stopped), None),
            (Phase::Running, Shutdown) => (self.to(Phase::Stopped), Some(Stop)),
            (_, Shutdown) => (
                Self {
                    shutdown_requested: true,
                    ..self
                },
                None,
            ),

            (Phase::Idle, Launch | ConfigChanged) => (self.to(Phase::Starting), Some(Start)),
            (Phase::Running, ConfigChanged) => (self.to(Phase::Restarting), Some(Stop)),
            (_, Launch | ConfigChanged) if phase.is_busy() => (
                Self {
                    pending_restart: true,
                    ..self
                },
                None,
            ),

            (Phase::Starting | Phase::Restarting, Started) => {
                if self.shutdown_requested {
                    (self.to(Phase::Stopped), Some(Stop))
                } else if self.pending_restart {
                    (
                        Self {
                            phase: Phase::Restarting,
                            pending_restart: false,
                            ..self
                        },
                        Some(Stop),
                    )
                } else {
                    (self.to(Phase::Running), None)
                }
            }

            (Phase::Starting | Phase::Restarting, StartFailed) => {
                if self.shutdown_requested {
                    (self.to(Phase::Stopped), None)
                } else if self.pending_restart {
                    (
                        Self {
                            phase: Phase::Starting,
                            pending_restart: false,
                            ..self
                        },
                        Some(Start),
                    )
                } else {
                    (self.to(Phase::Idle), None)
                }
            }

            (Phase::Restarting, TornDown) => {
                if self.shutdown_requested {
                    (self.to(Phase::Stopped), None)
                } else {
                    (self.to(Phase::Restarting), Some(Start))
                }
            }

            // Out-of-order completions carry no information.
            _ => (self, None),
        }
    }
}
