use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use futures_util::future::join_all;
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    models::{alert_message, WatchEntry, ALERT_SUBJECT},
    services::{monitor::MonitorState, notifier::Notifier, quotes::QuoteSource},
};

/// Nominal time between two poll cycles.
pub const POLL_PERIOD: Duration = Duration::from_millis(60_000);

/// Upper bound on a single price lookup or email send. A lookup that runs
/// past it is skipped for the cycle like any other failed lookup.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Active,
}

/// What one cycle did, mostly for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub checked: usize,
    pub skipped: usize,
    pub triggered: usize,
    pub notified: usize,
    pub discarded: bool,
}

struct Shared {
    monitor: Arc<MonitorState>,
    quotes: Arc<dyn QuoteSource>,
    notifier: Arc<dyn Notifier>,
    // bumped on stop; cycles started under an older value drop their results
    generation: AtomicU64,
}

/// Repeating price check over the watch list.
///
/// Each tick snapshots the watch list and runs the cycle in its own task,
/// so slow lookups never delay the timer and cycles may overlap.
pub struct PollLoop {
    shared: Arc<Shared>,
    period: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl PollLoop {
    pub fn new(
        monitor: Arc<MonitorState>,
        quotes: Arc<dyn QuoteSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                monitor,
                quotes,
                notifier,
                generation: AtomicU64::new(0),
            }),
            period: POLL_PERIOD,
            timer: Mutex::new(None),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn state(&self) -> PollState {
        match *self.timer() {
            Some(_) => PollState::Active,
            None => PollState::Idle,
        }
    }

    fn timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Idle -> Active. The first cycle runs one full period after this call.
    /// Must be called from inside a tokio runtime.
    pub fn start(&self) {
        let mut timer = self.timer();
        if timer.is_some() {
            tracing::warn!("[poll-loop] start called while already active");
            return;
        }

        let shared = self.shared.clone();
        let period = self.period;

        *timer = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let snapshot = shared.monitor.watchlist();
                let generation = shared.generation.load(Ordering::SeqCst);
                let shared = shared.clone();

                tokio::spawn(async move {
                    let report = shared.run_cycle(snapshot, generation).await;
                    tracing::debug!("[poll-loop] cycle done: {:?}", report);
                });
            }
        }));

        tracing::info!("[poll-loop] started, period {:?}", period);
    }

    /// Active -> Idle. Cancels the timer; lookups already in flight finish
    /// but their results are dropped.
    pub fn stop(&self) {
        let Some(timer) = self.timer().take() else {
            return;
        };

        timer.abort();
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        tracing::info!("[poll-loop] stopped");
    }

    /// Runs one cycle immediately against the current watch list and waits
    /// for it, including notifications.
    pub async fn run_cycle(&self) -> CycleReport {
        let snapshot = self.shared.monitor.watchlist();
        let generation = self.shared.generation.load(Ordering::SeqCst);
        self.shared.run_cycle(snapshot, generation).await
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    async fn run_cycle(&self, snapshot: Vec<WatchEntry>, generation: u64) -> CycleReport {
        let mut report = CycleReport {
            checked: snapshot.len(),
            ..CycleReport::default()
        };

        if snapshot.is_empty() {
            return report;
        }

        let prices = join_all(snapshot.iter().map(|e| async move {
            match time::timeout(CALL_TIMEOUT, self.quotes.current_price(&e.symbol)).await {
                Ok(res) => res.map_err(|e| e.to_string()),
                Err(_) => Err(format!("no answer within {:?}", CALL_TIMEOUT)),
            }
        }))
        .await;

        let mut messages = Vec::new();
        let mut outbox: Vec<(String, String)> = Vec::new();

        for (entry, res) in snapshot.iter().zip(prices) {
            let price = match res {
                Ok(Some(p)) if p.is_finite() => p,
                Ok(_) => {
                    tracing::debug!("[poll-loop] no price for {}, skipping", entry.symbol);
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::debug!("[poll-loop] lookup for {} failed, skipping: {}", entry.symbol, e);
                    report.skipped += 1;
                    continue;
                }
            };

            if !entry.is_hit(price) {
                continue;
            }

            let msg = alert_message(entry, price);
            if !entry.email.trim().is_empty() {
                outbox.push((entry.email.clone(), msg.clone()));
            }
            messages.push(msg);
        }

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("[poll-loop] session ended mid-cycle, dropping {} alerts", messages.len());
            report.discarded = true;
            return report;
        }

        report.triggered = messages.len();
        self.monitor.record_alerts(messages);

        let sends = outbox.iter().map(|(to, msg)| async move {
            match time::timeout(CALL_TIMEOUT, self.notifier.notify(to, ALERT_SUBJECT, msg)).await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    // alert is already recorded; email is best-effort
                    tracing::warn!("[poll-loop] email to {} failed: {}", to, e);
                    false
                }
                Err(_) => {
                    tracing::warn!("[poll-loop] email to {} timed out", to);
                    false
                }
            }
        });
        report.notified = join_all(sends).await.into_iter().filter(|ok| *ok).count();

        report
    }
}
