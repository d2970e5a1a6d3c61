//! Settings-file watcher.
//!
//! Watches the directory holding the settings file and reports changes to
//! that one file. Editors often replace a file rather than write it in place,
//! so watching the directory is what keeps rename-on-save visible.
//!
//! Bursts of events are coalesced on the trailing edge: a change is reported
//! once the file has been quiet for the debounce window, so the last write of
//! a burst is always the one the receiver sees.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::discovery::SettingsRequest;
use crate::error::{Result, SettingsError};

/// Default window in which repeated writes count as one change.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// A qualifying change to the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsChange {
    pub path: PathBuf,
}

/// Settings-file watcher. Dropping it stops the watch.
pub struct SettingsWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl SettingsWatcher {
    /// Watch the settings file a request reads.
    pub fn for_request(
        request: &SettingsRequest,
    ) -> Result<(Self, mpsc::Receiver<SettingsChange>)> {
        Self::new(request.settings_path(), DEFAULT_DEBOUNCE)
    }

    /// Watch `path`, reporting one change after each burst that stays quiet for `debounce`.
    ///
    /// The file itself need not exist yet; its directory must.
    pub fn new(
        path: PathBuf,
        debounce: Duration,
    ) -> Result<(Self, mpsc::Receiver<SettingsChange>)> {
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| SettingsError::NotFound(path.clone()))?;
        if !dir.is_dir() {
            return Err(SettingsError::NotFound(dir));
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| SettingsError::NotFound(path.clone()))?;

        let (tx, rx) = mpsc::channel(16);
        let (raw_tx, raw_rx) = std_mpsc::channel::<()>();
        let target = path.clone();

        thread::Builder::new()
            .name("nut-settings-debounce".to_string())
            .spawn(move || debounce_events(raw_rx, debounce, target, tx))?;

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    warn!("settings watcher error: {e}");
                    return;
                }
            };

            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                return;
            }

            let touches_settings = event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(file_name.as_os_str()));
            if !touches_settings {
                return;
            }

            let _ = raw_tx.send(());
        })?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok((
            Self {
                _watcher: watcher,
                path,
            },
            rx,
        ))
    }

    /// The settings file being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Forward one [`SettingsChange`] per quiet period.
///
/// Returns when the watcher is dropped or the receiver goes away. A burst
/// still pending when the watcher is dropped is discarded.
fn debounce_events(
    raw: std_mpsc::Receiver<()>,
    debounce: Duration,
    path: PathBuf,
    tx: mpsc::Sender<SettingsChange>,
) {
    while raw.recv().is_ok() {
        loop {
            match raw.recv_timeout(debounce) {
                Ok(()) => {}
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }

        debug!(path = %path.display(), "settings file changed");
        if tx
            .blocking_send(SettingsChange { path: path.clone() })
            .is_err()
        {
            return;
        }
    }
}
