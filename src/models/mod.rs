pub mod watch_entry;
pub mod alert;

pub use watch_entry::WatchEntry;
pub use alert::{alert_message, ALERT_SUBJECT};
