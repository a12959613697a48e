//! Sync engine for fetching inbox mail into local storage

mod inbox;

pub use inbox::{DEFAULT_MAX_RESULTS, SyncStats, sync_inbox};
