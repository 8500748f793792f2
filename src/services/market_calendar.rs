use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;

/// Decides whether the market is open and how long the monitor waits between checks.
pub trait MarketHours: Send + Sync {
    fn is_open(&self, now: DateTime<chrono::Utc>) -> bool;

    /// Wait between poll cycles while the market is open.
    fn open_poll_delay(&self) -> Duration;

    /// Wait before re-checking while the market is closed.
    fn closed_retry_delay(&self) -> Duration;
}

/// Weekly schedule: one daily window (inclusive on both ends) evaluated in a
/// single canonical time zone, with whole weekdays closed.
#[derive(Debug, Clone)]
pub struct MarketCalendar {
    pub tz: Tz,
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub closed_days: Vec<Weekday>,
    pub open_poll_delay: Duration,
    pub closed_retry_delay: Duration,
}

impl Default for MarketCalendar {
    /// NSE cash session.
    fn default() -> Self {
        Self {
            tz: chrono_tz::Asia::Kolkata,
            open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
            closed_days: vec![Weekday::Sat, Weekday::Sun],
            open_poll_delay: Duration::from_secs(60),
            closed_retry_delay: Duration::from_secs(600),
        }
    }
}

impl MarketCalendar {
    pub fn is_open_at<Z: TimeZone>(&self, now: &DateTime<Z>) -> bool {
        let local = now.with_timezone(&self.tz);

        if self.closed_days.contains(&local.weekday()) {
            return false;
        }

        let t = local.time();
        self.open <= t && t <= self.close
    }
}

impl MarketHours for MarketCalendar {
    fn is_open(&self, now: DateTime<chrono::Utc>) -> bool {
        self.is_open_at(&now)
    }

    fn open_poll_delay(&self) -> Duration {
        self.open_poll_delay
    }

    fn closed_retry_delay(&self) -> Duration {
        self.closed_retry_delay
    }
}

/// Parses `HH:MM` (or `HH:MM:SS`).
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Parses a comma separated weekday list such as `Sat,Sun`. Unknown names are skipped.
pub fn parse_weekdays(s: &str) -> Vec<Weekday> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse::<Weekday>().ok())
        .collect()
}
