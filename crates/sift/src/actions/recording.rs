//! Mail service that records calls instead of sending them
//!
//! Backs `sift apply --dry-run` and the dispatcher/engine tests.

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{Result, bail};

use super::MailService;
use crate::models::EmailId;
use crate::rules::Action;

/// One recorded mail-service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailCall {
    pub email_id: EmailId,
    pub action: Action,
}

/// Records every call in order; optionally fails chosen ones
#[derive(Default)]
pub struct RecordingMailService {
    calls: Mutex<Vec<MailCall>>,
    failing: Mutex<HashSet<(String, String)>>,
}

impl RecordingMailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `action` on `email_id` fail with a transport-style error
    ///
    /// Failed calls are not recorded.
    pub fn fail_on(&self, email_id: &str, action: &Action) {
        self.failing
            .lock()
            .unwrap()
            .insert((email_id.to_string(), action.to_string()));
    }

    /// Calls that succeeded, in the order they were made
    pub fn calls(&self) -> Vec<MailCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made for a single email
    pub fn calls_for(&self, email_id: &str) -> Vec<Action> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.email_id.as_str() == email_id)
            .map(|c| c.action.clone())
            .collect()
    }

    fn record(&self, id: &EmailId, action: Action) -> Result<()> {
        let key = (id.as_str().to_string(), action.to_string());
        if self.failing.lock().unwrap().contains(&key) {
            bail!("simulated transport error");
        }

        self.calls.lock().unwrap().push(MailCall {
            email_id: id.clone(),
            action,
        });
        Ok(())
    }
}

impl MailService for RecordingMailService {
    fn mark_read(&self, id: &EmailId) -> Result<()> {
        self.record(id, Action::MarkRead)
    }

    fn mark_unread(&self, id: &EmailId) -> Result<()> {
        self.record(id, Action::MarkUnread)
    }

    fn move_to_label(&self, id: &EmailId, label_id: &str) -> Result<()> {
        self.record(id, Action::MoveToLabel(label_id.to_string()))
    }
}
