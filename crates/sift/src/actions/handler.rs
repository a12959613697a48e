//! Gmail-backed mail service
//!
//! Coordinates between the Gmail API and local storage for mutations.

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use super::MailService;
use super::labels;
use crate::gmail::GmailClient;
use crate::models::EmailId;
use crate::storage::EmailStore;

/// Adds and removes labels on a remote message
pub trait LabelModifier: Send + Sync {
    fn modify_labels(&self, id: &EmailId, add: &[&str], remove: &[&str]) -> Result<()>;
}

impl LabelModifier for GmailClient {
    fn modify_labels(&self, id: &EmailId, add: &[&str], remove: &[&str]) -> Result<()> {
        self.modify_message(id, add, remove)
    }
}

/// Mail service that applies actions through Gmail
///
/// Actions are performed in two steps:
/// 1. Call the Gmail API to update server state
/// 2. Mirror the change in local storage
///
/// The server stays the source of truth. Only the API call decides whether
/// an action succeeded; a failed mirror write is logged and the stored
/// record is refreshed by the next fetch.
pub struct ActionHandler {
    gmail: Arc<dyn LabelModifier>,
    store: Arc<dyn EmailStore>,
}

impl ActionHandler {
    pub fn new(gmail: Arc<dyn LabelModifier>, store: Arc<dyn EmailStore>) -> Self {
        Self { gmail, store }
    }

    fn mirror_unread(&self, id: &EmailId, unread: bool) {
        if let Err(e) = self.store.set_unread(id, unread) {
            warn!("Failed to update stored unread flag for {}: {:#}", id, e);
        }
    }
}

impl MailService for ActionHandler {
    fn mark_read(&self, id: &EmailId) -> Result<()> {
        self.gmail.modify_labels(id, &[], &[labels::UNREAD])?;
        self.mirror_unread(id, false);
        info!("Marked {} as read", id);
        Ok(())
    }

    fn mark_unread(&self, id: &EmailId) -> Result<()> {
        self.gmail.modify_labels(id, &[labels::UNREAD], &[])?;
        self.mirror_unread(id, true);
        info!("Marked {} as unread", id);
        Ok(())
    }

    fn move_to_label(&self, id: &EmailId, label_id: &str) -> Result<()> {
        // The stored record has no label set, so there is nothing to mirror
        self.gmail.modify_labels(id, &[label_id], &[labels::INBOX])?;
        info!("Moved {} to {}", id, label_id);
        Ok(())
    }
}
