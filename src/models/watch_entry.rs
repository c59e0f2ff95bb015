use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    pub symbol: String,
    pub target_price: f64,
    pub email: String,
}

impl WatchEntry {
    /// Builds an entry from raw form text.
    ///
    /// Returns `None` when any field is blank or the target is not a finite
    /// number. The symbol is normalized to trimmed upper case; the email is
    /// kept as typed.
    pub fn from_input(symbol: &str, target_price: &str, email: &str) -> Option<Self> {
        let symbol = symbol.trim();
        let target = target_price.trim();

        if symbol.is_empty() || target.is_empty() || email.trim().is_empty() {
            return None;
        }

        let target_price = target.parse::<f64>().ok().filter(|v| v.is_finite())?;

        Some(Self {
            symbol: symbol.to_uppercase(),
            target_price,
            email: email.to_string(),
        })
    }

    pub fn is_hit(&self, current_price: f64) -> bool {
        current_price.is_finite() && current_price <= self.target_price
    }
}
