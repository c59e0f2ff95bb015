use axum::{
    extract::{Form, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    render,
    services::monitor::{ALERTS_UPDATED, WATCHLIST_UPDATED},
    AppState,
};

fn hx_trigger_value(events: &[&str]) -> HeaderValue {
    if events.len() == 1 {
        return HeaderValue::from_str(events[0]).unwrap_or_else(|_| HeaderValue::from_static(""));
    }

    let mut map = serde_json::Map::new();
    for &e in events {
        map.insert(e.to_string(), serde_json::Value::Bool(true));
    }

    let json = serde_json::Value::Object(map).to_string();
    HeaderValue::from_str(&json).unwrap_or_else(|_| HeaderValue::from_static(""))
}

fn watchlist_html(state: &AppState) -> String {
    let ctx = render::watchlist_ctx(&state.monitor.watchlist());
    render::render_partial(state, "partials/watchlist", &ctx)
}

#[derive(Deserialize)]
pub struct AddWatchForm {
    #[serde(default)]
    pub symbol: String,
    #[serde(rename = "targetPrice", default)]
    pub target_price: String,
    #[serde(default)]
    pub email: String,
}

// GET /watchlist/list
pub async fn get_watchlist_list(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Html(watchlist_html(&state))).into_response()
}

// POST /watchlist
pub async fn post_add_watch(
    State(state): State<AppState>,
    Form(form): Form<AddWatchForm>,
) -> Response {
    let added = state
        .monitor
        .add(&form.symbol, &form.target_price, &form.email);

    let html = watchlist_html(&state);

    // incomplete input: same list back, no trigger, form keeps its values
    if !added {
        return (StatusCode::OK, Html(html)).into_response();
    }

    let mut headers = HeaderMap::new();
    headers.insert("HX-Trigger", hx_trigger_value(&[WATCHLIST_UPDATED]));

    (StatusCode::OK, headers, Html(html)).into_response()
}

// POST /clear
pub async fn post_clear(State(state): State<AppState>) -> Response {
    state.monitor.clear_all();

    let mut headers = HeaderMap::new();
    headers.insert(
        "HX-Trigger",
        hx_trigger_value(&[WATCHLIST_UPDATED, ALERTS_UPDATED]),
    );

    (StatusCode::OK, headers, Html(watchlist_html(&state))).into_response()
}

// GET /alerts/list
pub async fn get_alerts_list(State(state): State<AppState>) -> Response {
    let ctx = render::alerts_ctx(&state.monitor.alert_records());
    let html = render::render_partial(&state, "partials/alerts", &ctx);
    (StatusCode::OK, Html(html)).into_response()
}
