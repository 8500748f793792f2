use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::monitor_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/monitor", get(monitor_controller::get_session))
        .route("/monitor/start", post(monitor_controller::post_start))
        .route("/monitor/stop", post(monitor_controller::post_stop))
}
