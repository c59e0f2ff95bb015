use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::watchlist_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/watchlist", post(watchlist_controller::post_add_watch))
        .route("/watchlist/list", get(watchlist_controller::get_watchlist_list))
        .route("/clear", post(watchlist_controller::post_clear))
        .route("/alerts/list", get(watchlist_controller::get_alerts_list))
}
