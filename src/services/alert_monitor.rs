use std::{sync::Arc, time::Duration};

use chrono::Utc;
use futures_util::future::join_all;
use rust_decimal::Decimal;
use tokio::{sync::watch, time};
use tracing::{debug, error, info, warn};

use super::{
    alert_sink::AlertSink,
    alert_state::{AlertDecision, AlertStateTracker},
    market_calendar::MarketHours,
    price_feed::{self, PollOutcome, PriceFeed},
    watchlist_store::{StoreError, WatchlistStore},
};
use crate::{render, templates::Hbs};

/// Everything the poll loop talks to.
#[derive(Clone)]
pub struct MonitorDeps {
    pub store: Arc<dyn WatchlistStore>,
    pub feed: Arc<dyn PriceFeed>,
    pub sink: Arc<dyn AlertSink>,
    pub hours: Arc<dyn MarketHours>,
    pub hbs: Hbs,

    /// Wait before retrying a cycle that failed as a whole. Never longer than
    /// the open-market poll delay.
    pub recovery_delay: Duration,

    /// Longest a single price fetch may take before it counts as failed.
    pub fetch_timeout: Duration,
}

/// What a single poll cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    MarketClosed,
    /// Market open but nothing on the watchlist.
    Idle,
    Polled { checked: usize, failed: usize, fired: usize },
}

/// One monitoring session's poll loop. Owns its alert state; only reads the
/// running flag.
pub struct Monitor {
    deps: MonitorDeps,
    channel: String,
    tracker: AlertStateTracker,
    market_was_open: Option<bool>,
}

impl Monitor {
    pub fn new(deps: MonitorDeps, channel: impl Into<String>) -> Self {
        Self::with_tracker(deps, channel, AlertStateTracker::new())
    }

    /// Resumes from the alert state a previous session ended with, so a
    /// crossing it already reported is not reported again.
    pub fn with_tracker(deps: MonitorDeps, channel: impl Into<String>, tracker: AlertStateTracker) -> Self {
        Self {
            deps,
            channel: channel.into(),
            tracker,
            market_was_open: None,
        }
    }

    /// Runs cycles until `running` flips to false (or its sender is dropped).
    /// Hands back the alert state on exit.
    pub async fn run(mut self, mut running: watch::Receiver<bool>) -> AlertStateTracker {
        info!(channel = %self.channel, "monitor loop started");

        while is_running(&running) {
            let delay = match self.run_cycle().await {
                Ok(CycleOutcome::MarketClosed) => self.deps.hours.closed_retry_delay(),
                Ok(outcome) => {
                    debug!(?outcome, "poll cycle finished");
                    self.deps.hours.open_poll_delay()
                }
                Err(e) => {
                    error!(error = %e, "poll cycle failed, retrying");
                    self.recovery_delay()
                }
            };

            if !pause(&mut running, delay).await {
                break;
            }
        }

        info!(channel = %self.channel, "monitor loop stopped");
        self.tracker
    }

    fn recovery_delay(&self) -> Duration {
        self.deps.recovery_delay.min(self.deps.hours.open_poll_delay())
    }

    /// One pass over the watchlist. Only whole-cycle failures come back as `Err`;
    /// per-symbol fetch and delivery failures are logged and skipped.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, StoreError> {
        if !self.deps.hours.is_open(Utc::now()) {
            if self.market_was_open != Some(false) {
                info!("market closed, pausing price checks");
                match render::market_closed(&self.deps.hbs) {
                    Ok(text) => self.notify(&text).await,
                    Err(e) => warn!(error = %e, "could not render market closed notice"),
                }
            }
            self.market_was_open = Some(false);
            return Ok(CycleOutcome::MarketClosed);
        }

        if self.market_was_open == Some(false) {
            info!("market open, resuming price checks");
        }
        self.market_was_open = Some(true);

        let watchlist = self.deps.store.list().await?;
        self.tracker.retain_symbols(watchlist.keys());

        if watchlist.is_empty() {
            return Ok(CycleOutcome::Idle);
        }

        let feed = &*self.deps.feed;
        let limit = self.deps.fetch_timeout;
        let fetches = watchlist.iter().map(|(symbol, target)| async move {
            let outcome = PollOutcome::from(price_feed::fetch_within(feed, symbol, limit).await);
            (symbol, *target, outcome)
        });
        let results = join_all(fetches).await;

        let mut failed = 0;
        let mut fired = 0;

        for (symbol, target, outcome) in results {
            let price = match outcome {
                PollOutcome::Success(p) => p,
                PollOutcome::Failure(e) => {
                    warn!(symbol = %symbol, error = %e, "price fetch failed");
                    failed += 1;
                    continue;
                }
            };

            debug!(symbol = %symbol, %price, %target, "price checked");

            if self.tracker.evaluate(symbol, price, target) == AlertDecision::Fire {
                fired += 1;
                self.alert_target_hit(symbol, price, target).await;
            }
        }

        Ok(CycleOutcome::Polled {
            checked: watchlist.len(),
            failed,
            fired,
        })
    }

    async fn alert_target_hit(&self, symbol: &str, price: Decimal, target: Decimal) {
        info!(symbol = %symbol, %price, %target, "target reached");

        match render::target_hit(&self.deps.hbs, symbol, price, target) {
            Ok(text) => self.notify(&text).await,
            Err(e) => warn!(symbol = %symbol, error = %e, "could not render alert"),
        }
    }

    async fn notify(&self, text: &str) {
        // not retried here; the next cycle re-evaluates anyway
        if let Err(e) = self.deps.sink.deliver(&self.channel, text).await {
            warn!(channel = %self.channel, error = %e, "alert delivery failed");
        }
    }
}

fn is_running(running: &watch::Receiver<bool>) -> bool {
    running.has_changed().is_ok() && *running.borrow()
}

/// Sleeps for `delay` unless stopped first. Returns whether the loop should go on.
async fn pause(running: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    tokio::select! {
        _ = time::sleep(delay) => {}
        _ = running.wait_for(|r| !*r) => {}
    }

    is_running(running)
}
