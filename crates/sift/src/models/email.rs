//! Email model: the snapshot rules are evaluated against

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an email (Gmail message ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailId(pub String);

impl EmailId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EmailId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EmailId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A stored inbox email
///
/// Emails are immutable snapshots. State changes go through a
/// [`MailService`](crate::actions::MailService), never through this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    /// Gmail message ID
    pub id: EmailId,
    /// Subject line
    pub subject: String,
    /// Raw `From` header (e.g., "Ads <ads@newsletter.com>")
    pub sender: String,
    /// When the message was received
    pub received_at: DateTime<Utc>,
    /// Short plain-text preview
    pub snippet: String,
    /// Whether the message carries the UNREAD label
    pub unread: bool,
}

impl Email {
    /// Create a new email builder
    pub fn builder(id: impl Into<EmailId>) -> EmailBuilder {
        EmailBuilder::new(id.into())
    }
}

/// Builder for creating Email instances
pub struct EmailBuilder {
    id: EmailId,
    subject: String,
    sender: String,
    received_at: Option<DateTime<Utc>>,
    snippet: String,
    unread: bool,
}

impl EmailBuilder {
    fn new(id: EmailId) -> Self {
        Self {
            id,
            subject: String::new(),
            sender: String::new(),
            received_at: None,
            snippet: String::new(),
            unread: false,
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = Some(received_at);
        self
    }

    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn unread(mut self, unread: bool) -> Self {
        self.unread = unread;
        self
    }

    pub fn build(self) -> Email {
        Email {
            id: self.id,
            subject: self.subject,
            sender: self.sender,
            received_at: self.received_at.unwrap_or_else(Utc::now),
            snippet: self.snippet,
            unread: self.unread,
        }
    }
}
