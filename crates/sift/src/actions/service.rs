//! Mail mutation capability

use anyhow::Result;

use crate::models::EmailId;
use crate::rules::Action;

/// Label IDs Gmail uses for the states rules can change
pub mod labels {
    pub const INBOX: &str = "INBOX";
    pub const UNREAD: &str = "UNREAD";
}

/// Remote operations an action can trigger
///
/// Each call may fail with a transport error. Implementations must not retry
/// on their own behalf; the dispatcher records the failure and moves on.
pub trait MailService: Send + Sync {
    /// Remove the UNREAD label
    fn mark_read(&self, id: &EmailId) -> Result<()>;

    /// Add the UNREAD label
    fn mark_unread(&self, id: &EmailId) -> Result<()>;

    /// Add `label_id` and remove the message from the inbox
    fn move_to_label(&self, id: &EmailId, label_id: &str) -> Result<()>;

    /// Route an action to the matching call
    fn apply(&self, id: &EmailId, action: &Action) -> Result<()> {
        match action {
            Action::MarkRead => self.mark_read(id),
            Action::MarkUnread => self.mark_unread(id),
            Action::MoveToLabel(label_id) => self.move_to_label(id, label_id),
        }
    }
}
