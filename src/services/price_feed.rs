use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::time;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Unknown or delisted symbol.
    #[error("{0}: no price data")]
    NotFound(String),

    /// Provider or network trouble; may succeed next cycle.
    #[error("price provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_latest(&self, symbol: &str) -> Result<Decimal, FeedError>;
}

/// Per-symbol result of one fetch attempt inside a poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Success(Decimal),
    Failure(FeedError),
}

impl From<Result<Decimal, FeedError>> for PollOutcome {
    fn from(r: Result<Decimal, FeedError>) -> Self {
        match r {
            Ok(p) => PollOutcome::Success(p),
            Err(e) => PollOutcome::Failure(e),
        }
    }
}

/// `fetch_latest` bounded by `limit`; a feed that does not answer in time is
/// reported as unavailable.
pub async fn fetch_within(
    feed: &dyn PriceFeed,
    symbol: &str,
    limit: Duration,
) -> Result<Decimal, FeedError> {
    match time::timeout(limit, feed.fetch_latest(symbol)).await {
        Ok(result) => result,
        Err(_) => Err(FeedError::Unavailable(format!("{symbol}: no answer within {limit:?}"))),
    }
}
