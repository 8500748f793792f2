use axum::{Router, routing::get};
use crate::{AppState, controllers::watchlist_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/watchlist",
            get(watchlist_controller::get_watchlist).post(watchlist_controller::post_add_entry),
        )
        .route(
            "/watchlist/:symbol",
            axum::routing::put(watchlist_controller::put_update_entry)
                .delete(watchlist_controller::delete_entry),
        )
        .route("/status", get(watchlist_controller::get_status))
}
