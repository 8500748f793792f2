use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::{
    bson::doc,
    options::{CollectionOptions, UpdateOptions, WriteConcern},
    Collection, Database,
};
use rust_decimal::Decimal;

use super::watchlist_store::{normalize, StoreError, Watchlist, WatchlistStore};
use crate::models::WatchEntry;

pub const COLLECTION: &str = "watchlist";

#[derive(Clone)]
pub struct MongoWatchlistStore {
    db: Database,
    entries: Collection<WatchEntry>,
}

impl MongoWatchlistStore {
    pub fn new(db: Database) -> Self {
        // journaled writes: an acknowledged upsert survives a mongod crash
        let opts = CollectionOptions::builder()
            .write_concern(WriteConcern::builder().journal(true).build())
            .build();

        let entries = db.collection_with_options::<WatchEntry>(COLLECTION, opts);

        Self { db, entries }
    }
}

#[async_trait]
impl WatchlistStore for MongoWatchlistStore {
    async fn list(&self) -> Result<Watchlist, StoreError> {
        let mut cursor = self.entries.find(doc! {}, None).await?;

        let mut out = Watchlist::new();
        while let Some(item) = cursor.next().await {
            let e = item?;
            out.insert(normalize(&e.symbol), e.target);
        }

        Ok(out)
    }

    async fn upsert(&self, symbol: &str, target: Decimal) -> Result<(), StoreError> {
        let sym = normalize(symbol);

        self.entries
            .update_one(
                doc! { "symbol": &sym },
                doc! { "$set": { "symbol": &sym, "target": target.to_string() } },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await?;

        Ok(())
    }

    async fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        let res = self
            .entries
            .delete_one(doc! { "symbol": normalize(symbol) }, None)
            .await?;

        Ok(res.deleted_count > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}
