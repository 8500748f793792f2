use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{render, services::watchlist_store::WatchlistStore, AppState};

pub async fn help(State(state): State<AppState>) -> impl IntoResponse {
    match render::help(&state.hbs) {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e).into_response(),
    }
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok".to_string())
}

pub async fn health_store(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(_) => (StatusCode::OK, "store: ok".to_string()).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("store error: {}", e),
        )
            .into_response(),
    }
}
