//! Storage trait definitions

use crate::models::{Email, EmailId};
use anyhow::Result;

/// Trait for email record storage
///
/// Abstracts over the in-memory and SQLite backends. Records come back in
/// insertion order, which is the order the engine evaluates them in.
pub trait EmailStore: Send + Sync {
    /// All stored emails, in insertion order
    fn load_all(&self) -> Result<Vec<Email>>;

    /// Drop every stored email and store `emails` in their place
    fn replace_all(&self, emails: Vec<Email>) -> Result<()>;

    /// Insert or update an email, keeping its original position on update
    fn upsert_email(&self, email: Email) -> Result<()>;

    /// Get an email by ID
    fn get_email(&self, id: &EmailId) -> Result<Option<Email>>;

    /// Update the unread flag; missing IDs are ignored
    fn set_unread(&self, id: &EmailId, unread: bool) -> Result<()>;

    /// Count stored emails
    fn count(&self) -> Result<usize>;

    /// Clear all data
    fn clear(&self) -> Result<()>;
}
