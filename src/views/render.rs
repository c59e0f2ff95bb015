use serde_json::json;

use crate::{models::WatchEntry, AppState};

fn fmt2(x: f64) -> String {
    format!("{:.2}", x)
}

pub fn watchlist_ctx(entries: &[WatchEntry]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .map(|e| {
            json!({
                "symbol": e.symbol,
                "target_price": fmt2(e.target_price),
                "email": e.email,
            })
        })
        .collect();

    json!({ "entries": items, "has_entries": !items.is_empty() })
}

pub fn alerts_ctx(alerts: &[String]) -> serde_json::Value {
    json!({ "alerts": alerts, "has_alerts": !alerts.is_empty() })
}

pub fn render_partial(state: &AppState, tpl: &str, ctx: &serde_json::Value) -> String {
    state
        .hbs
        .render(tpl, ctx)
        .unwrap_or_else(|e| format!("template error: {e}"))
}

/// Wraps a rendered body in the base layout.
pub fn render_full(state: &AppState, title: &str, body_html: String) -> Result<String, String> {
    let ctx = json!({
        "title": title,
        "body": body_html,
    });

    state
        .hbs
        .render("layouts/base", &ctx)
        .map_err(|e| e.to_string())
}
