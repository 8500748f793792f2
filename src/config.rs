use std::{env, path::PathBuf, time::Duration};

use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;

use crate::services::market_calendar::{self, MarketCalendar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub store_backend: StoreBackend,
    pub watchlist_file: PathBuf,
    pub mongodb_uri: String,
    pub mongodb_db: String,

    pub finnhub_api_key: String,
    pub telegram_bot_token: String,
    pub alert_channel: String,

    pub market_tz: Tz,
    pub market_open: NaiveTime,
    pub market_close: NaiveTime,
    pub market_closed_days: Vec<Weekday>,

    pub open_poll_delay: Duration,
    pub closed_retry_delay: Duration,
    pub recovery_delay: Duration,
    pub fetch_timeout: Duration,
}

impl Settings {
    pub fn calendar(&self) -> MarketCalendar {
        MarketCalendar {
            tz: self.market_tz,
            open: self.market_open,
            close: self.market_close,
            closed_days: self.market_closed_days.clone(),
            open_poll_delay: self.open_poll_delay,
            closed_retry_delay: self.closed_retry_delay,
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn secs_or(key: &str, default: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(default);

    Duration::from_secs(secs)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = MarketCalendar::default();

    let host = var_or("HOST", "127.0.0.1");
    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let store_backend = match var_or("WATCHLIST_BACKEND", "json").to_lowercase().as_str() {
        "mongo" | "mongodb" => StoreBackend::Mongo,
        "memory" => StoreBackend::Memory,
        _ => StoreBackend::Json,
    };
    let watchlist_file = PathBuf::from(var_or("WATCHLIST_FILE", "stocks.json"));
    let mongodb_uri = var_or("MONGODB_URI", "mongodb://localhost:27017");
    let mongodb_db = var_or("MONGODB_DB", "stockwatch");

    let finnhub_api_key = var_or("FINNHUB_API_KEY", "");
    let telegram_bot_token = var_or("TELEGRAM_BOT_TOKEN", "");
    let alert_channel = var_or("ALERT_CHANNEL", "default");

    let market_tz = env::var("MARKET_TZ")
        .ok()
        .and_then(|s| s.trim().parse::<Tz>().ok())
        .unwrap_or(defaults.tz);
    let market_open = env::var("MARKET_OPEN")
        .ok()
        .and_then(|s| market_calendar::parse_time(&s))
        .unwrap_or(defaults.open);
    let market_close = env::var("MARKET_CLOSE")
        .ok()
        .and_then(|s| market_calendar::parse_time(&s))
        .unwrap_or(defaults.close);
    let market_closed_days = env::var("MARKET_CLOSED_DAYS")
        .map(|s| market_calendar::parse_weekdays(&s))
        .unwrap_or(defaults.closed_days);

    let open_poll_delay = secs_or("OPEN_POLL_SECS", defaults.open_poll_delay.as_secs());
    let closed_retry_delay = secs_or("CLOSED_RETRY_SECS", defaults.closed_retry_delay.as_secs());
    // retry a failed cycle sooner than a normal poll
    let recovery_delay = secs_or("RECOVERY_SECS", 15).min(open_poll_delay / 2);
    let fetch_timeout = secs_or("FETCH_TIMEOUT_SECS", 10);

    Settings {
        host,
        port,
        store_backend,
        watchlist_file,
        mongodb_uri,
        mongodb_db,
        finnhub_api_key,
        telegram_bot_token,
        alert_channel,
        market_tz,
        market_open,
        market_close,
        market_closed_days,
        open_poll_delay,
        closed_retry_delay,
        recovery_delay,
        fetch_timeout,
    }
}
