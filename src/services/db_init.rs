use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

use super::mongo_store::COLLECTION;

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // watchlist: one entry per symbol, upserts rely on it
    let col = db.collection::<mongodb::bson::Document>(COLLECTION);
    let model = IndexModel::builder()
        .keys(doc! { "symbol": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    col.create_index(model, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
