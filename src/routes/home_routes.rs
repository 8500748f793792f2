use axum::{Router, routing::get};
use crate::{AppState, controllers::home_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/", get(home_controller::help))
        .route("/help", get(home_controller::help))
        .route("/health", get(home_controller::health))
        .route("/health/store", get(home_controller::health_store))
}
