use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::sync::Semaphore;

use async_trait::async_trait;
use stockwatch::{
    error::{NotifyError, QuoteError},
    services::{
        monitor::MonitorState,
        notifier::Notifier,
        poll_loop::{PollLoop, PollState, CALL_TIMEOUT, POLL_PERIOD},
        quotes::QuoteSource,
        storage::MemoryStore,
    },
};

#[derive(Default)]
struct FakeQuotes {
    prices: Mutex<HashMap<String, Option<f64>>>,
}

impl FakeQuotes {
    fn set(&self, symbol: &str, price: Option<f64>) {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
    }
}

#[async_trait]
impl QuoteSource for FakeQuotes {
    async fn current_price(&self, symbol: &str) -> Result<Option<f64>, QuoteError> {
        match self.prices.lock().unwrap().get(symbol) {
            Some(p) => Ok(*p),
            None => Err(QuoteError::Status {
                status: 404,
                body: "unknown symbol".to_string(),
            }),
        }
    }
}

/// Answers every symbol with a fixed price, but only once a permit is
/// released. `HANG` never answers at all.
struct GatedQuotes {
    price: f64,
    gate: Semaphore,
    asked: Mutex<Vec<String>>,
}

impl GatedQuotes {
    fn new(price: f64) -> Self {
        Self {
            price,
            gate: Semaphore::new(0),
            asked: Mutex::new(Vec::new()),
        }
    }

    fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    async fn wait_until_asked(&self, n: usize) {
        while self.asked().len() < n {
            tokio::task::yield_now().await;
        }
    }

    fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl QuoteSource for GatedQuotes {
    async fn current_price(&self, symbol: &str) -> Result<Option<f64>, QuoteError> {
        self.asked.lock().unwrap().push(symbol.to_string());
        if symbol == "HANG" {
            std::future::pending::<()>().await;
        }
        let _permit = self.gate.acquire().await;
        Ok(Some(self.price))
    }
}

fn gated_monitor() -> Arc<MonitorState> {
    let (events_tx, _rx) = tokio::sync::broadcast::channel::<String>(16);
    Arc::new(MonitorState::load(Arc::new(MemoryStore::new()), events_tx))
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &str, subject: &str, message: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), subject.to_string(), message.to_string()));
        if self.fail {
            return Err(NotifyError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(())
    }
}

struct Harness {
    monitor: Arc<MonitorState>,
    quotes: Arc<FakeQuotes>,
    notifier: Arc<RecordingNotifier>,
    poll: PollLoop,
}

fn harness_with(notifier: RecordingNotifier) -> Harness {
    let (events_tx, _rx) = tokio::sync::broadcast::channel::<String>(16);
    let monitor = Arc::new(MonitorState::load(Arc::new(MemoryStore::new()), events_tx));
    let quotes = Arc::new(FakeQuotes::default());
    let notifier = Arc::new(notifier);
    let poll = PollLoop::new(monitor.clone(), quotes.clone(), notifier.clone());

    Harness {
        monitor,
        quotes,
        notifier,
        poll,
    }
}

fn harness() -> Harness {
    harness_with(RecordingNotifier::default())
}

#[tokio::test]
async fn below_target_records_alert_and_sends_one_email() {
    let h = harness();
    h.monitor.add("AAPL", "100.00", "me@example.com");
    h.quotes.set("AAPL", Some(95.0));

    let report = h.poll.run_cycle().await;

    assert_eq!(report.triggered, 1);
    assert_eq!(
        h.monitor.alert_records(),
        vec!["AAPL dropped to $95 (target: $100.00)".to_string()]
    );

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "me@example.com");
    assert_eq!(sent[0].1, "Stock Alert");
    assert_eq!(sent[0].2, "AAPL dropped to $95 (target: $100.00)");
}

#[tokio::test]
async fn equal_to_target_triggers() {
    let h = harness();
    h.monitor.add("AAPL", "100", "me@example.com");
    h.quotes.set("AAPL", Some(100.0));

    h.poll.run_cycle().await;

    assert_eq!(h.monitor.alert_records().len(), 1);
}

#[tokio::test]
async fn above_target_does_nothing() {
    let h = harness();
    h.monitor.add("AAPL", "100.00", "me@example.com");
    h.quotes.set("AAPL", Some(105.0));

    let report = h.poll.run_cycle().await;

    assert_eq!(report.triggered, 0);
    assert!(h.monitor.alert_records().is_empty());
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn missing_price_is_skipped_and_entry_kept() {
    let h = harness();
    h.monitor.add("AAPL", "100.00", "me@example.com");
    h.quotes.set("AAPL", None);

    let report = h.poll.run_cycle().await;

    assert_eq!(report.skipped, 1);
    assert!(h.monitor.alert_records().is_empty());
    assert!(h.notifier.sent().is_empty());
    assert_eq!(h.monitor.watchlist().len(), 1);

    // picked up on a later cycle once a price shows up
    h.quotes.set("AAPL", Some(99.0));
    h.poll.run_cycle().await;
    assert_eq!(h.monitor.alert_records().len(), 1);
}

#[tokio::test]
async fn failed_lookup_skips_only_that_entry() {
    let h = harness();
    h.monitor.add("NOPE", "100", "a@example.com");
    h.monitor.add("MSFT", "300", "b@example.com");
    h.quotes.set("MSFT", Some(250.5));

    let report = h.poll.run_cycle().await;

    assert_eq!(report.skipped, 1);
    assert_eq!(
        h.monitor.alert_records(),
        vec!["MSFT dropped to $250.5 (target: $300.00)".to_string()]
    );
}

#[tokio::test]
async fn repeated_condition_alerts_every_cycle() {
    let h = harness();
    h.monitor.add("AAPL", "100", "me@example.com");
    h.quotes.set("AAPL", Some(95.0));

    h.poll.run_cycle().await;
    h.poll.run_cycle().await;

    assert_eq!(h.monitor.alert_records().len(), 2);
    assert_eq!(h.notifier.sent().len(), 2);
}

#[tokio::test]
async fn alerts_follow_watchlist_order() {
    let h = harness();
    h.monitor.add("TSLA", "200", "a@example.com");
    h.monitor.add("AAPL", "100", "b@example.com");
    h.quotes.set("TSLA", Some(180.0));
    h.quotes.set("AAPL", Some(90.0));

    h.poll.run_cycle().await;

    let alerts = h.monitor.alert_records();
    assert!(alerts[0].starts_with("TSLA"));
    assert!(alerts[1].starts_with("AAPL"));
}

#[tokio::test]
async fn blank_recipient_records_but_does_not_notify() {
    let h = harness();
    // stored data can carry a blank email even though the form rejects it
    let raw = r#"[{"symbol":"AAPL","targetPrice":100,"email":""}]"#;
    let (events_tx, _rx) = tokio::sync::broadcast::channel::<String>(16);
    let monitor = Arc::new(MonitorState::load(
        Arc::new(MemoryStore::with_slot("watchlist", raw)),
        events_tx,
    ));
    let poll = PollLoop::new(monitor.clone(), h.quotes.clone(), h.notifier.clone());
    h.quotes.set("AAPL", Some(50.0));

    poll.run_cycle().await;

    assert_eq!(monitor.alert_records().len(), 1);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn notifier_failure_still_records_alert() {
    let h = harness_with(RecordingNotifier::failing());
    h.monitor.add("AAPL", "100", "me@example.com");
    h.quotes.set("AAPL", Some(10.0));

    let report = h.poll.run_cycle().await;

    assert_eq!(report.triggered, 1);
    assert_eq!(report.notified, 0);
    assert_eq!(h.monitor.alert_records().len(), 1);
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn clear_empties_watchlist_and_alerts() {
    let h = harness();
    h.monitor.add("AAPL", "100", "me@example.com");
    h.quotes.set("AAPL", Some(95.0));
    h.poll.run_cycle().await;

    h.monitor.clear_all();

    assert!(h.monitor.watchlist().is_empty());
    assert!(h.monitor.alert_records().is_empty());

    let report = h.poll.run_cycle().await;
    assert_eq!(report.checked, 0);
}

#[tokio::test(start_paused = true)]
async fn timer_fires_every_period_until_stopped() {
    let h = harness();
    h.monitor.add("AAPL", "100", "me@example.com");
    h.quotes.set("AAPL", Some(95.0));

    assert_eq!(h.poll.state(), PollState::Idle);
    h.poll.start();
    assert_eq!(h.poll.state(), PollState::Active);

    // nothing before the first full period
    tokio::time::sleep(POLL_PERIOD - Duration::from_secs(1)).await;
    assert!(h.monitor.alert_records().is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.monitor.alert_records().len(), 1);

    tokio::time::sleep(POLL_PERIOD).await;
    assert_eq!(h.monitor.alert_records().len(), 2);
    assert_eq!(h.notifier.sent().len(), 2);

    h.poll.stop();
    assert_eq!(h.poll.state(), PollState::Idle);

    tokio::time::sleep(POLL_PERIOD * 3).await;
    assert_eq!(h.monitor.alert_records().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn tick_uses_watchlist_at_fire_time() {
    let h = harness();
    h.quotes.set("AAPL", Some(95.0));
    h.quotes.set("MSFT", Some(10.0));
    h.monitor.add("AAPL", "100", "me@example.com");

    h.poll.start();
    tokio::time::sleep(POLL_PERIOD + Duration::from_secs(1)).await;
    assert_eq!(h.monitor.alert_records().len(), 1);

    h.monitor.add("MSFT", "20", "me@example.com");
    tokio::time::sleep(POLL_PERIOD).await;
    assert_eq!(h.monitor.alert_records().len(), 3);

    h.poll.stop();
}

#[tokio::test(start_paused = true)]
async fn hung_lookup_only_skips_its_own_entry() {
    let monitor = gated_monitor();
    let quotes = Arc::new(GatedQuotes::new(95.0));
    let notifier = Arc::new(RecordingNotifier::default());
    let poll = PollLoop::new(monitor.clone(), quotes.clone(), notifier.clone());

    monitor.add("HANG", "100", "a@example.com");
    monitor.add("AAPL", "100", "b@example.com");
    quotes.release(100);

    let report = poll.run_cycle().await;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.triggered, 1);
    assert_eq!(
        monitor.alert_records(),
        vec!["AAPL dropped to $95 (target: $100.00)".to_string()]
    );
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn hung_lookup_does_not_stall_the_timer() {
    let monitor = gated_monitor();
    let quotes = Arc::new(GatedQuotes::new(95.0));
    let notifier = Arc::new(RecordingNotifier::default());
    let poll = PollLoop::new(monitor.clone(), quotes.clone(), notifier.clone());

    monitor.add("HANG", "100", "a@example.com");
    monitor.add("AAPL", "100", "b@example.com");
    quotes.release(100);

    poll.start();
    tokio::time::sleep(POLL_PERIOD * 5 + CALL_TIMEOUT + Duration::from_secs(1)).await;
    poll.stop();

    let alerts = monitor.alert_records();
    assert_eq!(alerts.len(), 5);
    assert!(alerts.iter().all(|a| a.starts_with("AAPL")));
}

#[tokio::test]
async fn lookup_finishing_after_stop_is_discarded() {
    let monitor = gated_monitor();
    let quotes = Arc::new(GatedQuotes::new(95.0));
    let notifier = Arc::new(RecordingNotifier::default());
    let poll = Arc::new(PollLoop::new(monitor.clone(), quotes.clone(), notifier.clone()));

    monitor.add("AAPL", "100", "me@example.com");
    poll.start();

    let cycle = {
        let poll = poll.clone();
        tokio::spawn(async move { poll.run_cycle().await })
    };
    quotes.wait_until_asked(1).await;

    poll.stop();
    assert_eq!(poll.state(), PollState::Idle);
    quotes.release(1);

    let report = cycle.await.unwrap();
    assert!(report.discarded);
    assert_eq!(report.triggered, 0);
    assert!(monitor.alert_records().is_empty());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn changes_during_a_cycle_do_not_affect_it() {
    let monitor = gated_monitor();
    let quotes = Arc::new(GatedQuotes::new(95.0));
    let notifier = Arc::new(RecordingNotifier::default());
    let poll = Arc::new(PollLoop::new(monitor.clone(), quotes.clone(), notifier.clone()));

    monitor.add("AAPL", "100", "me@example.com");

    let cycle = {
        let poll = poll.clone();
        tokio::spawn(async move { poll.run_cycle().await })
    };
    quotes.wait_until_asked(1).await;

    monitor.clear_all();
    monitor.add("MSFT", "300", "me@example.com");
    quotes.release(10);

    let report = cycle.await.unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(quotes.asked(), vec!["AAPL".to_string()]);
    assert_eq!(
        monitor.alert_records(),
        vec!["AAPL dropped to $95 (target: $100.00)".to_string()]
    );
    assert_eq!(notifier.sent().len(), 1);

    // the next cycle sees only what is on the list now
    quotes.release(10);
    let report = poll.run_cycle().await;
    assert_eq!(report.checked, 1);
    assert_eq!(quotes.asked(), vec!["AAPL".to_string(), "MSFT".to_string()]);
}
