//! Inbox sync implementation

use anyhow::Result;
use log::{info, warn};

use crate::actions::labels;
use crate::gmail::api::GmailMessage;
use crate::gmail::{GmailClient, normalize_email};
use crate::models::{Email, EmailId};
use crate::storage::EmailStore;

/// Default number of inbox messages fetched per sync
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Statistics from a sync operation
#[derive(Debug, Default, Clone)]
pub struct SyncStats {
    /// Message IDs listed by Gmail
    pub messages_listed: usize,
    /// Emails written to the store
    pub emails_stored: usize,
    /// Messages that failed to fetch or normalize
    pub errors: usize,
    /// Duration of the sync operation
    pub duration_ms: u64,
}

/// Replace the store's contents with the newest `max_results` inbox messages
///
/// The store is reset on every sync, so each run evaluates rules against a
/// fresh snapshot of the inbox. Individual fetch failures are counted and
/// skipped; listing failures abort the sync.
pub fn sync_inbox(
    gmail: &GmailClient,
    store: &dyn EmailStore,
    max_results: usize,
) -> Result<SyncStats> {
    let start = std::time::Instant::now();
    let mut stats = SyncStats::default();

    let list_response = gmail.list_messages(labels::INBOX, max_results, None)?;
    let ids: Vec<EmailId> = list_response
        .messages
        .unwrap_or_default()
        .into_iter()
        .map(|m| EmailId::new(m.id))
        .collect();
    stats.messages_listed = ids.len();

    let (emails, errors) = collect_emails(&ids, gmail.get_messages_batch(&ids));
    stats.errors = errors;
    stats.emails_stored = emails.len();
    store.replace_all(emails)?;

    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Synced {} of {} inbox messages in {}ms",
        stats.emails_stored, stats.messages_listed, stats.duration_ms
    );
    Ok(stats)
}

/// Normalize fetched messages in list order, counting the ones that failed
fn collect_emails(ids: &[EmailId], results: Vec<Result<GmailMessage>>) -> (Vec<Email>, usize) {
    let mut emails = Vec::with_capacity(ids.len());
    let mut errors = 0;

    for (id, result) in ids.iter().zip(results) {
        match result.and_then(normalize_email) {
            Ok(email) => emails.push(email),
            Err(e) => {
                warn!("Skipping message {}: {:#}", id, e);
                errors += 1;
            }
        }
    }

    (emails, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_gmail_message(id: &str, internal_date: &str) -> GmailMessage {
        GmailMessage {
            id: id.to_string(),
            label_ids: Some(vec!["INBOX".to_string()]),
            snippet: String::new(),
            internal_date: internal_date.to_string(),
            payload: None,
        }
    }

    #[test]
    fn test_collect_emails_keeps_list_order() {
        let ids = vec![EmailId::new("b"), EmailId::new("a")];
        let results = vec![
            Ok(make_gmail_message("b", "1700000000000")),
            Ok(make_gmail_message("a", "1600000000000")),
        ];

        let (emails, errors) = collect_emails(&ids, results);

        assert_eq!(errors, 0);
        let got: Vec<&str> = emails.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(got, vec!["b", "a"]);
    }

    #[test]
    fn test_collect_emails_skips_failures() {
        let ids = vec![EmailId::new("a"), EmailId::new("b"), EmailId::new("c")];
        let results = vec![
            Err(anyhow::anyhow!("HTTP 500")),
            Ok(make_gmail_message("b", "not-a-date")),
            Ok(make_gmail_message("c", "1700000000000")),
        ];

        let (emails, errors) = collect_emails(&ids, results);

        assert_eq!(errors, 2);
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].id.as_str(), "c");
    }
}
