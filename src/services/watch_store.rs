use std::sync::Arc;

use crate::models::WatchEntry;
use crate::services::storage::KeyValueStore;

pub const WATCHLIST_KEY: &str = "watchlist";

/// The watch collection, written through to a [`KeyValueStore`] on every
/// change.
pub struct WatchStore {
    backend: Arc<dyn KeyValueStore>,
    entries: Vec<WatchEntry>,
}

impl WatchStore {
    /// Rehydrates the collection from the backend. Missing or unreadable
    /// data starts an empty collection.
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let entries = match backend.get(WATCHLIST_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<WatchEntry>>(&raw) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("stored watchlist is malformed, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("could not read stored watchlist, starting empty: {}", e);
                Vec::new()
            }
        };

        tracing::info!("watchlist loaded: {} entries", entries.len());

        Self { backend, entries }
    }

    /// Appends an entry built from raw form text. Incomplete input is
    /// ignored; the return value says whether anything changed.
    pub fn add(&mut self, symbol: &str, target_price: &str, email: &str) -> bool {
        let Some(entry) = WatchEntry::from_input(symbol, target_price, email) else {
            return false;
        };

        tracing::info!("watching {} at {:.2}", entry.symbol, entry.target_price);
        self.entries.push(entry);
        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.backend.remove(WATCHLIST_KEY) {
            tracing::warn!("could not remove stored watchlist: {}", e);
        }
    }

    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<WatchEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&self.entries) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("could not serialize watchlist: {}", e);
                return;
            }
        };

        if let Err(e) = self.backend.set(WATCHLIST_KEY, &raw) {
            tracing::warn!("could not persist watchlist: {}", e);
        }
    }
}
