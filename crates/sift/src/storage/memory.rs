//! In-memory storage implementation
//!
//! Used by tests and for runs that should not touch the database.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::RwLock;

use super::EmailStore;
use crate::models::{Email, EmailId};

/// In-memory implementation of EmailStore
///
/// Emails are kept in a Vec to preserve insertion order, with a side index
/// from ID to position.
pub struct InMemoryEmailStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    emails: Vec<Email>,
    positions: HashMap<String, usize>,
}

impl InMemoryEmailStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for InMemoryEmailStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn upsert(&mut self, email: Email) {
        match self.positions.get(email.id.as_str()) {
            Some(&pos) => self.emails[pos] = email,
            None => {
                self.positions.insert(email.id.0.clone(), self.emails.len());
                self.emails.push(email);
            }
        }
    }
}

impl EmailStore for InMemoryEmailStore {
    fn load_all(&self) -> Result<Vec<Email>> {
        Ok(self.inner.read().unwrap().emails.clone())
    }

    fn replace_all(&self, emails: Vec<Email>) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        *inner = Inner::default();
        for email in emails {
            inner.upsert(email);
        }
        Ok(())
    }

    fn upsert_email(&self, email: Email) -> Result<()> {
        self.inner.write().unwrap().upsert(email);
        Ok(())
    }

    fn get_email(&self, id: &EmailId) -> Result<Option<Email>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .positions
            .get(id.as_str())
            .map(|&pos| inner.emails[pos].clone()))
    }

    fn set_unread(&self, id: &EmailId, unread: bool) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if let Some(&pos) = inner.positions.get(id.as_str()) {
            inner.emails[pos].unread = unread;
        }
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.inner.read().unwrap().emails.len())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.write().unwrap() = Inner::default();
        Ok(())
    }
}
