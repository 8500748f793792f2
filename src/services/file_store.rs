use std::path::PathBuf;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::{io::AsyncWriteExt, sync::RwLock};

use super::watchlist_store::{normalize, StoreError, Watchlist, WatchlistStore};

/// Watchlist kept as a pretty-printed JSON object (`{"TCS.NS": "3100"}`).
///
/// The whole list lives in memory; every mutation rewrites the file through a
/// temp file + rename so a crash mid-write leaves the previous version intact.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<Watchlist>,
}

impl JsonFileStore {
    /// Loads `path` if it exists; a missing file is an empty watchlist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(|b| b.is_ascii_whitespace()) => Watchlist::new(),
            Ok(bytes) => parse(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Watchlist::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(path = %path.display(), entries = entries.len(), "watchlist file loaded");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn persist(&self, entries: &Watchlist) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(entries)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&body).await?;
        // on disk before the rename makes it visible
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn parse(bytes: &[u8]) -> Result<Watchlist, StoreError> {
    let raw: Watchlist =
        serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;

    Ok(raw.into_iter().map(|(s, t)| (normalize(&s), t)).collect())
}

#[async_trait]
impl WatchlistStore for JsonFileStore {
    async fn list(&self) -> Result<Watchlist, StoreError> {
        Ok(self.entries.read().await.clone())
    }

    async fn upsert(&self, symbol: &str, target: Decimal) -> Result<(), StoreError> {
        // hold the write lock across the disk write so two writers can't interleave
        let mut entries = self.entries.write().await;
        let mut next = entries.clone();
        next.insert(normalize(symbol), target);

        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        let key = normalize(symbol);
        let mut entries = self.entries.write().await;
        if !entries.contains_key(&key) {
            return Ok(false);
        }

        let mut next = entries.clone();
        next.remove(&key);

        self.persist(&next).await?;
        *entries = next;
        Ok(true)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
