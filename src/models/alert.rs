use super::WatchEntry;

pub const ALERT_SUBJECT: &str = "Stock Alert";

/// Renders the alert line shown in the page and sent as the email body.
///
/// The current price keeps its shortest decimal form (`95`, `95.5`); the
/// target shows at least two decimals but is never rounded.
pub fn alert_message(entry: &WatchEntry, current_price: f64) -> String {
    format!(
        "{} dropped to ${} (target: ${})",
        entry.symbol,
        current_price,
        fmt_target(entry.target_price)
    )
}

fn fmt_target(target: f64) -> String {
    let cents = format!("{:.2}", target);
    if cents.parse::<f64>().ok() == Some(target) {
        cents
    } else {
        target.to_string()
    }
}
