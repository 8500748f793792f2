use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{services::watchlist_service::{self, WatchlistError}, AppState};

#[derive(Deserialize)]
pub struct AddEntryBody {
    pub symbol: String,
    pub target: serde_json::Value,
}

#[derive(Deserialize)]
pub struct UpdateEntryBody {
    pub target: serde_json::Value,
}

/// Targets may arrive as JSON numbers or strings.
fn target_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

pub fn error_response(e: WatchlistError) -> Response {
    let status = match &e {
        WatchlistError::InvalidSymbol(_) | WatchlistError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
        WatchlistError::UnknownSymbol(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WatchlistError::NotWatched(_) => StatusCode::NOT_FOUND,
        WatchlistError::Feed(_) => StatusCode::SERVICE_UNAVAILABLE,
        WatchlistError::Store(_) => {
            tracing::error!(error = %e, "watchlist store error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

// GET /watchlist
pub async fn get_watchlist(State(state): State<AppState>) -> Response {
    match watchlist_service::list(&state).await {
        Ok(list) => {
            let entries: Vec<serde_json::Value> = list
                .iter()
                .map(|(symbol, target)| json!({ "symbol": symbol, "target": target }))
                .collect();

            (StatusCode::OK, Json(json!({ "entries": entries }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

// POST /watchlist
pub async fn post_add_entry(
    State(state): State<AppState>,
    Json(body): Json<AddEntryBody>,
) -> Response {
    match watchlist_service::add(&state, &body.symbol, &target_text(&body.target)).await {
        Ok(entry) => (
            StatusCode::OK,
            Json(json!({
                "entry": entry,
                "message": format!("➕ Added {} with target price {}", entry.symbol, entry.target),
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

// PUT /watchlist/:symbol
pub async fn put_update_entry(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Json(body): Json<UpdateEntryBody>,
) -> Response {
    match watchlist_service::update(&state, &symbol, &target_text(&body.target)).await {
        Ok(entry) => (
            StatusCode::OK,
            Json(json!({
                "entry": entry,
                "message": format!("🔄 Updated {} target price to {}", entry.symbol, entry.target),
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

// DELETE /watchlist/:symbol
pub async fn delete_entry(State(state): State<AppState>, Path(symbol): Path<String>) -> Response {
    match watchlist_service::remove(&state, &symbol).await {
        Ok(removed) => {
            let sym = symbol.trim().to_uppercase();
            let message = if removed {
                format!("➖ Removed {sym} from monitoring.")
            } else {
                format!("{sym} is not in monitoring list.")
            };

            (StatusCode::OK, Json(json!({ "removed": removed, "message": message }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

// GET /status
pub async fn get_status(State(state): State<AppState>) -> Response {
    let items = match watchlist_service::snapshot_status(&state).await {
        Ok(v) => v,
        Err(e) => return error_response(e),
    };

    let report = crate::render::status_report(&state.hbs, &items)
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Json(json!({ "items": items, "report": report }))).into_response()
}
