use std::sync::LazyLock;

use futures_util::future::join_all;
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use super::{
    price_feed::{self, FeedError},
    watchlist_store::{StoreError, Watchlist, WatchlistStore},
};
use crate::{
    models::{SymbolStatus, WatchEntry},
    AppState,
};

// exchange-qualified tickers: TCS.NS, BRK-B, ^NSEI, EURUSD=X
static SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9^][A-Z0-9.\-_^=&]{0,31}$").expect("symbol regex")
});

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("{0} is not a valid symbol")]
    InvalidSymbol(String),

    #[error("{0} is not a valid target price")]
    InvalidTarget(String),

    #[error("{0} is an invalid stock symbol, cannot add")]
    UnknownSymbol(String),

    #[error("{0} is not in the monitoring list, add it first")]
    NotWatched(String),

    #[error("could not verify symbol: {0}")]
    Feed(FeedError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn parse_symbol(raw: &str) -> Result<String, WatchlistError> {
    let sym = raw.trim().to_uppercase();
    if !SYMBOL_RE.is_match(&sym) {
        return Err(WatchlistError::InvalidSymbol(raw.trim().to_string()));
    }
    Ok(sym)
}

pub fn parse_target(raw: &str) -> Result<Decimal, WatchlistError> {
    let s = raw.trim();
    let target: Decimal = s
        .parse()
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| WatchlistError::InvalidTarget(s.to_string()))?;

    if target <= Decimal::ZERO {
        return Err(WatchlistError::InvalidTarget(s.to_string()));
    }

    Ok(target.normalize())
}

fn fetch_timeout(state: &AppState) -> std::time::Duration {
    state.sessions.deps().fetch_timeout
}

pub async fn list(state: &AppState) -> Result<Watchlist, WatchlistError> {
    Ok(state.store.list().await?)
}

/// Adds or overwrites an entry after checking the feed knows the symbol.
pub async fn add(state: &AppState, symbol: &str, target: &str) -> Result<WatchEntry, WatchlistError> {
    let sym = parse_symbol(symbol)?;
    let target = parse_target(target)?;

    match price_feed::fetch_within(&*state.feed, &sym, fetch_timeout(state)).await {
        Ok(_) => {}
        Err(FeedError::NotFound(_)) => return Err(WatchlistError::UnknownSymbol(sym)),
        Err(e) => return Err(WatchlistError::Feed(e)),
    }

    state.store.upsert(&sym, target).await?;
    tracing::info!(symbol = %sym, %target, "watchlist entry added");

    Ok(WatchEntry::new(&sym, target))
}

/// Changes the target of a symbol that is already watched.
pub async fn update(state: &AppState, symbol: &str, target: &str) -> Result<WatchEntry, WatchlistError> {
    let sym = parse_symbol(symbol)?;
    let target = parse_target(target)?;

    if !state.store.list().await?.contains_key(&sym) {
        return Err(WatchlistError::NotWatched(sym));
    }

    state.store.upsert(&sym, target).await?;
    tracing::info!(symbol = %sym, %target, "watchlist target updated");

    Ok(WatchEntry::new(&sym, target))
}

/// Returns whether the symbol was on the list. Removing an absent symbol is fine.
pub async fn remove(state: &AppState, symbol: &str) -> Result<bool, WatchlistError> {
    let sym = parse_symbol(symbol)?;
    let removed = state.store.remove(&sym).await?;

    if removed {
        tracing::info!(symbol = %sym, "watchlist entry removed");
    }

    Ok(removed)
}

/// One fetch + compare per watched symbol. Read-only: does not touch the
/// monitor's alert state.
pub async fn snapshot_status(state: &AppState) -> Result<Vec<SymbolStatus>, WatchlistError> {
    let watchlist = state.store.list().await?;

    let feed = &*state.feed;
    let limit = fetch_timeout(state);
    let checks = watchlist.iter().map(|(symbol, target)| async move {
        match price_feed::fetch_within(feed, symbol, limit).await {
            Ok(price) => SymbolStatus {
                symbol: symbol.clone(),
                target: *target,
                price: Some(price),
                reached: price >= *target,
                error: None,
            },
            Err(e) => SymbolStatus {
                symbol: symbol.clone(),
                target: *target,
                price: None,
                reached: false,
                error: Some(match e {
                    FeedError::NotFound(_) => "No data available".to_string(),
                    FeedError::Unavailable(_) => "Error fetching data".to_string(),
                }),
            },
        }
    });

    Ok(join_all(checks).await)
}
