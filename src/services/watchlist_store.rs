use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::RwLock;

/// Snapshot of the watchlist, keyed by uppercase symbol.
pub type Watchlist = BTreeMap<String, Decimal>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(String),

    #[error("watchlist file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("watchlist data is corrupt: {0}")]
    Corrupt(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Db(e.to_string())
    }
}

/// Durable symbol -> target mapping.
///
/// Every method must have persisted its change before it returns `Ok`.
/// Implementations normalise symbols to uppercase.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    async fn list(&self) -> Result<Watchlist, StoreError>;

    /// Insert or overwrite. Never fails because the symbol already exists.
    async fn upsert(&self, symbol: &str, target: Decimal) -> Result<(), StoreError>;

    /// Returns whether an entry was actually removed. Absent symbols are not an error.
    async fn remove(&self, symbol: &str) -> Result<bool, StoreError>;

    /// Cheap reachability check used by `/health/store`.
    async fn ping(&self) -> Result<(), StoreError> {
        self.list().await.map(|_| ())
    }
}

pub(crate) fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Process-local store. Nothing survives a restart; used by tests and the
/// `memory` backend.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<Watchlist>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        let map = entries
            .into_iter()
            .map(|(s, t)| (normalize(s.as_ref()), t))
            .collect();

        Self {
            entries: RwLock::new(map),
        }
    }
}

#[async_trait]
impl WatchlistStore for MemoryStore {
    async fn list(&self) -> Result<Watchlist, StoreError> {
        Ok(self.entries.read().await.clone())
    }

    async fn upsert(&self, symbol: &str, target: Decimal) -> Result<(), StoreError> {
        self.entries.write().await.insert(normalize(symbol), target);
        Ok(())
    }

    async fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(&normalize(symbol)).is_some())
    }
}
