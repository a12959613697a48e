//! SQLite-based email storage

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rusqlite_migration::{M, Migrations};

use super::traits::EmailStore;
use crate::models::{Email, EmailId};

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        r#"
        CREATE TABLE emails (
            id TEXT PRIMARY KEY,
            subject TEXT NOT NULL,
            sender TEXT NOT NULL,
            received_at TEXT NOT NULL,
            snippet TEXT NOT NULL,
            unread INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )])
}

const SELECT_COLUMNS: &str = "SELECT id, subject, sender, received_at, snippet, unread FROM emails";

/// SQLite-based email storage
///
/// Rows are returned in rowid order, which is insertion order; upserts keep
/// the original rowid.
pub struct SqliteEmailStore {
    conn: Mutex<Connection>,
}

impl SqliteEmailStore {
    /// Open (or create) the database at `db_path` and run migrations
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        // WAL lets a second `sift` process read while a fetch is writing
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;

        migrations()
            .to_latest(&mut conn)
            .context("Failed to run database migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn insert(conn: &Connection, email: &Email) -> Result<()> {
        conn.execute(
            "INSERT INTO emails (id, subject, sender, received_at, snippet, unread)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                subject = excluded.subject,
                sender = excluded.sender,
                received_at = excluded.received_at,
                snippet = excluded.snippet,
                unread = excluded.unread",
            params![
                email.id.as_str(),
                email.subject,
                email.sender,
                email.received_at.to_rfc3339(),
                email.snippet,
                email.unread,
            ],
        )?;
        Ok(())
    }
}

/// Map a row selected with `SELECT_COLUMNS`
fn email_from_row(row: &Row<'_>) -> rusqlite::Result<Email> {
    let received_at: String = row.get(3)?;
    let received_at = DateTime::parse_from_rfc3339(&received_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Email {
        id: EmailId::new(row.get::<_, String>(0)?),
        subject: row.get(1)?,
        sender: row.get(2)?,
        received_at,
        snippet: row.get(4)?,
        unread: row.get(5)?,
    })
}

impl EmailStore for SqliteEmailStore {
    fn load_all(&self) -> Result<Vec<Email>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("{} ORDER BY rowid", SELECT_COLUMNS))?;
        let emails = stmt
            .query_map([], email_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load emails")?;
        Ok(emails)
    }

    fn replace_all(&self, emails: Vec<Email>) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM emails", [])?;
        for email in &emails {
            Self::insert(&tx, email)?;
        }
        tx.commit().context("Failed to commit email replacement")?;
        Ok(())
    }

    fn upsert_email(&self, email: Email) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        Self::insert(&conn, &email)
    }

    fn get_email(&self, id: &EmailId) -> Result<Option<Email>> {
        let conn = self.conn.lock().unwrap();
        let email = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                [id.as_str()],
                email_from_row,
            )
            .optional()?;
        Ok(email)
    }

    fn set_unread(&self, id: &EmailId, unread: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE emails SET unread = ? WHERE id = ?",
            params![unread, id.as_str()],
        )?;
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM emails", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM emails", [])?;
        Ok(())
    }
}
