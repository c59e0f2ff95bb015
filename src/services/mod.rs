pub mod storage;
pub mod watch_store;
pub mod alert_log;
pub mod monitor;
pub mod quotes;
pub mod notifier;
pub mod poll_loop;
