use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use crate::{
    models::WatchEntry,
    services::{alert_log::AlertLog, storage::KeyValueStore, watch_store::WatchStore},
};

pub const WATCHLIST_UPDATED: &str = "watchlistUpdated";
pub const ALERTS_UPDATED: &str = "alertsUpdated";

/// Watch store + alert log behind one lock. Every mutation publishes an
/// event name so open pages can refresh.
///
/// The lock is never held across an `.await`.
pub struct MonitorState {
    store: Mutex<WatchStore>,
    alerts: Mutex<AlertLog>,
    events_tx: broadcast::Sender<String>,
}

impl MonitorState {
    pub fn load(backend: Arc<dyn KeyValueStore>, events_tx: broadcast::Sender<String>) -> Self {
        Self {
            store: Mutex::new(WatchStore::load(backend)),
            alerts: Mutex::new(AlertLog::new()),
            events_tx,
        }
    }

    pub fn add(&self, symbol: &str, target_price: &str, email: &str) -> bool {
        let added = self.store().add(symbol, target_price, email);
        if added {
            self.publish(WATCHLIST_UPDATED);
        }
        added
    }

    /// Empties both the watch list and the alert log.
    pub fn clear_all(&self) {
        self.store().clear();
        self.alerts().clear();
        tracing::info!("watchlist and alerts cleared");
        self.publish(WATCHLIST_UPDATED);
        self.publish(ALERTS_UPDATED);
    }

    pub fn watchlist(&self) -> Vec<WatchEntry> {
        self.store().snapshot()
    }

    pub fn record_alerts(&self, messages: Vec<String>) {
        if messages.is_empty() {
            return;
        }

        {
            let mut log = self.alerts();
            for m in messages {
                tracing::info!("alert: {}", m);
                log.record(m);
            }
        }
        self.publish(ALERTS_UPDATED);
    }

    pub fn alert_records(&self) -> Vec<String> {
        self.alerts().records().to_vec()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.events_tx.subscribe()
    }

    fn publish(&self, event: &str) {
        // no subscribers is fine
        let _ = self.events_tx.send(event.to_string());
    }

    fn store(&self) -> MutexGuard<'_, WatchStore> {
        self.store.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn alerts(&self) -> MutexGuard<'_, AlertLog> {
        self.alerts.lock().unwrap_or_else(|p| p.into_inner())
    }
}
