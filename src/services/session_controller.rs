use thiserror::Error;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tracing::{info, warn};

use super::{
    alert_monitor::{Monitor, MonitorDeps},
    alert_state::AlertStateTracker,
    watchlist_store::{StoreError, WatchlistStore},
};
use crate::models::{MonitorSession, MonitorState};

#[derive(Debug, Error)]
pub enum StartError {
    #[error("monitoring is already running")]
    AlreadyRunning,

    #[error("no stocks to monitor, add one first")]
    EmptyWatchlist,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

struct ActiveSession {
    channel: String,
    running: watch::Sender<bool>,
    task: JoinHandle<AlertStateTracker>,
}

impl ActiveSession {
    /// Started and not yet asked to stop.
    fn is_live(&self) -> bool {
        *self.running.borrow() && !self.task.is_finished()
    }

    fn request_stop(&self) {
        self.running.send_replace(false);
    }

    /// Waits for the loop to exit, which is at most one cycle after a stop.
    async fn join(self) -> AlertStateTracker {
        match self.task.await {
            Ok(tracker) => tracker,
            Err(e) => {
                warn!(channel = %self.channel, error = %e, "monitor loop ended abnormally");
                AlertStateTracker::new()
            }
        }
    }
}

/// Owns the single monitoring session of this instance.
///
/// The running flag is written only here (start/stop); the poll loop reads it.
/// A stopped session stays in the slot until its loop has been joined, so a
/// restart never overlaps a loop still finishing its last cycle.
pub struct SessionController {
    deps: MonitorDeps,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionController {
    pub fn new(deps: MonitorDeps) -> Self {
        Self {
            deps,
            active: Mutex::new(None),
        }
    }

    /// Starts the poll loop delivering to `channel`. Returns how many symbols
    /// were on the watchlist at start.
    ///
    /// A closed market is not a reason to refuse; the loop waits for the open.
    /// If a stopped loop is still mid-cycle this waits for it, bounded by the
    /// fetch timeout, and carries its alert state over.
    pub async fn start(&self, channel: &str) -> Result<usize, StartError> {
        let mut active = self.active.lock().await;

        if active.as_ref().is_some_and(ActiveSession::is_live) {
            return Err(StartError::AlreadyRunning);
        }

        let watchlist = self.deps.store.list().await?;
        if watchlist.is_empty() {
            return Err(StartError::EmptyWatchlist);
        }

        let tracker = match active.take() {
            Some(previous) => {
                previous.request_stop();
                previous.join().await
            }
            None => AlertStateTracker::new(),
        };

        let (running, rx) = watch::channel(true);
        let monitor = Monitor::with_tracker(self.deps.clone(), channel, tracker);
        let task = tokio::spawn(monitor.run(rx));

        info!(channel = %channel, symbols = watchlist.len(), "monitoring started");

        *active = Some(ActiveSession {
            channel: channel.to_string(),
            running,
            task,
        });

        Ok(watchlist.len())
    }

    /// Asks the loop to stop. It exits at its next suspension point, which
    /// may be after this returns; no new cycle starts either way.
    pub async fn stop(&self) -> StopOutcome {
        let active = self.active.lock().await;

        match active.as_ref() {
            Some(session) if session.is_live() => {
                session.request_stop();
                info!(channel = %session.channel, "monitoring stopped");
                StopOutcome::Stopped
            }
            _ => StopOutcome::NotRunning,
        }
    }

    /// Stops the loop and waits for it to finish. Used on process shutdown.
    pub async fn shutdown(&self) {
        let session = self.active.lock().await.take();

        if let Some(session) = session {
            session.request_stop();
            let channel = session.channel.clone();
            session.join().await;
            info!(channel = %channel, "monitor loop joined");
        }
    }

    pub async fn session(&self) -> MonitorSession {
        let active = self.active.lock().await;

        match active.as_ref() {
            Some(s) if s.is_live() => MonitorSession {
                state: MonitorState::Running,
                owner_channel: Some(s.channel.clone()),
            },
            _ => MonitorSession::stopped(),
        }
    }

    pub fn deps(&self) -> &MonitorDeps {
        &self.deps
    }
}
