use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    render,
    services::{
        session_controller::{StartError, StopOutcome},
        watchlist_service,
    },
    AppState,
};

#[derive(Deserialize)]
pub struct StartRequest {
    pub channel: Option<String>,
}

fn non_blank(channel: Option<String>) -> Option<String> {
    channel.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

// POST /monitor/start?channel=...  or  {"channel": "..."}
pub async fn post_start(
    State(state): State<AppState>,
    Query(q): Query<StartRequest>,
    body: Option<Json<StartRequest>>,
) -> Response {
    let from_body = body.and_then(|Json(b)| non_blank(b.channel));
    let channel = from_body
        .or_else(|| non_blank(q.channel))
        .unwrap_or_else(|| state.settings.alert_channel.clone());

    let count = match state.sessions.start(&channel).await {
        Ok(n) => n,
        Err(StartError::AlreadyRunning) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "outcome": "already_running", "message": "⚡ Monitoring is already running." })),
            )
                .into_response();
        }
        Err(StartError::EmptyWatchlist) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "outcome": "empty_watchlist", "message": "❌ No stocks to monitor. Add one first." })),
            )
                .into_response();
        }
        Err(e @ StartError::Store(_)) => {
            tracing::error!(error = %e, "could not start monitoring");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
                .into_response();
        }
    };

    let message = render::monitoring_started(&state.hbs, count)
        .unwrap_or_else(|e| format!("template error: {e}"));

    // current prices, as a first look
    let status = match watchlist_service::snapshot_status(&state).await {
        Ok(items) => json!(items),
        Err(e) => {
            tracing::warn!(error = %e, "initial status snapshot failed");
            serde_json::Value::Null
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "outcome": "started",
            "channel": channel,
            "message": message,
            "status": status,
        })),
    )
        .into_response()
}

// POST /monitor/stop
pub async fn post_stop(State(state): State<AppState>) -> Response {
    let body = match state.sessions.stop().await {
        StopOutcome::Stopped => json!({ "outcome": "stopped", "message": "🛑 Stopped monitoring stocks." }),
        StopOutcome::NotRunning => {
            json!({ "outcome": "not_running", "message": "⚠ Monitoring is not running." })
        }
    };

    (StatusCode::OK, Json(body)).into_response()
}

// GET /monitor
pub async fn get_session(State(state): State<AppState>) -> Response {
    let session = state.sessions.session().await;
    (StatusCode::OK, Json(json!(session))).into_response()
}
