#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use stockwatch::{
    config,
    services::{
        alert_monitor::MonitorDeps,
        alert_sink::{AlertSink, SinkError},
        market_calendar::MarketHours,
        price_feed::{FeedError, PriceFeed},
        session_controller::SessionController,
        watchlist_store::{MemoryStore, StoreError, Watchlist, WatchlistStore},
    },
    templates, AppState,
};

pub const OPEN_POLL: Duration = Duration::from_secs(60);
pub const CLOSED_RETRY: Duration = Duration::from_secs(600);
pub const RECOVERY: Duration = Duration::from_secs(5);
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(45);

/// Feed that plays back a script of results per symbol; the last result repeats.
#[derive(Default)]
pub struct ScriptedFeed {
    scripts: Mutex<HashMap<String, VecDeque<Result<Decimal, FeedError>>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, symbol: &str, results: Vec<Result<Decimal, FeedError>>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(symbol.to_string(), results.into_iter().collect());
    }

    pub fn prices(&self, symbol: &str, prices: &[Decimal]) {
        self.script(symbol, prices.iter().copied().map(Ok).collect());
    }

    pub fn calls(&self, symbol: &str) -> usize {
        self.calls.lock().unwrap().get(symbol).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl PriceFeed for ScriptedFeed {
    async fn fetch_latest(&self, symbol: &str) -> Result<Decimal, FeedError> {
        *self.calls.lock().unwrap().entry(symbol.to_string()).or_default() += 1;

        let mut scripts = self.scripts.lock().unwrap();
        let Some(queue) = scripts.get_mut(symbol) else {
            return Err(FeedError::NotFound(symbol.to_string()));
        };

        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(FeedError::NotFound(symbol.to_string())))
        }
    }
}

/// Feed that takes `delay` to answer every request with the same price and
/// records how many requests were in flight at once.
pub struct SlowFeed {
    price: Decimal,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl SlowFeed {
    pub fn new(price: Decimal, delay: Duration) -> Self {
        Self {
            price,
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceFeed for SlowFeed {
    async fn fetch_latest(&self, _symbol: &str) -> Result<Decimal, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.price)
    }
}

/// Feed that never answers.
#[derive(Default)]
pub struct HangingFeed {
    calls: AtomicUsize,
}

impl HangingFeed {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceFeed for HangingFeed {
    async fn fetch_latest(&self, _symbol: &str) -> Result<Decimal, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Serves `app` on an ephemeral local port and returns its base url.
pub async fn serve_stub(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Accepts connections and never writes a byte back.
pub async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
    attempts: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let s = Self::default();
        s.failing.store(true, Ordering::SeqCst);
        s
    }

    pub fn messages(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.contains("reached the target"))
            .collect()
    }

    pub fn closed_notices(&self) -> usize {
        self.messages()
            .iter()
            .filter(|m| m.contains("Market is closed"))
            .count()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn deliver(&self, destination: &str, text: &str) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Transport("connection reset".to_string()));
        }

        self.delivered
            .lock()
            .unwrap()
            .push((destination.to_string(), text.to_string()));
        Ok(())
    }
}

/// Calendar whose open/closed answer is flipped by the test.
pub struct SwitchCalendar {
    open: AtomicBool,
}

impl SwitchCalendar {
    pub fn new(open: bool) -> Self {
        Self {
            open: AtomicBool::new(open),
        }
    }

    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }
}

impl MarketHours for SwitchCalendar {
    fn is_open(&self, _now: chrono::DateTime<chrono::Utc>) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn open_poll_delay(&self) -> Duration {
        OPEN_POLL
    }

    fn closed_retry_delay(&self) -> Duration {
        CLOSED_RETRY
    }
}

/// Memory store whose `list` can be made to fail a number of times.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failures_left: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl WatchlistStore for FlakyStore {
    async fn list(&self) -> Result<Watchlist, StoreError> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(StoreError::Db("server selection timeout".to_string()));
        }
        self.inner.list().await
    }

    async fn upsert(&self, symbol: &str, target: Decimal) -> Result<(), StoreError> {
        self.inner.upsert(symbol, target).await
    }

    async fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        self.inner.remove(symbol).await
    }
}

pub struct Harness {
    pub store: Arc<dyn WatchlistStore>,
    pub feed: Arc<ScriptedFeed>,
    pub sink: Arc<RecordingSink>,
    pub calendar: Arc<SwitchCalendar>,
    pub deps: MonitorDeps,
}

pub fn harness(store: Arc<dyn WatchlistStore>, sink: RecordingSink, open: bool) -> Harness {
    let feed = Arc::new(ScriptedFeed::new());
    let sink = Arc::new(sink);
    let calendar = Arc::new(SwitchCalendar::new(open));

    let deps = MonitorDeps {
        store: store.clone(),
        feed: feed.clone(),
        sink: sink.clone(),
        hours: calendar.clone(),
        hbs: templates::build_handlebars(),
        recovery_delay: RECOVERY,
        fetch_timeout: FETCH_TIMEOUT,
    };

    Harness {
        store,
        feed,
        sink,
        calendar,
        deps,
    }
}

pub fn test_state(h: &Harness) -> AppState {
    let (events_tx, _events_rx) = tokio::sync::broadcast::channel::<String>(16);

    AppState {
        hbs: h.deps.hbs.clone(),
        store: h.store.clone(),
        feed: h.feed.clone(),
        sessions: Arc::new(SessionController::new(h.deps.clone())),
        settings: config::load(),
        events_tx,
    }
}
