//! Sift - rule-based classification for a Gmail inbox
//!
//! This crate provides:
//! - The rule engine: condition evaluation, ALL/ANY combination and
//!   in-order action dispatch
//! - Rule-file loading
//! - Gmail API client and OAuth authentication
//! - Email storage (in-memory and SQLite)
//! - Inbox sync into local storage
//!
//! Collaborators are passed in explicitly: the engine only sees a
//! [`MailService`], and sync only sees an [`EmailStore`].

pub mod actions;
pub mod config;
pub mod engine;
pub mod error;
pub mod gmail;
pub mod models;
pub mod rules;
pub mod storage;
pub mod sync;

pub use actions::{
    ActionHandler, DispatchReport, FailurePolicy, LabelModifier, MailCall, MailService,
    RecordingMailService, dispatch,
};
pub use config::{GmailCredentials, Settings};
pub use engine::{CancelToken, RuleEngine, RunSummary, rule_matches};
pub use error::{MailServiceError, RuleError};
pub use gmail::{GmailAuth, GmailClient};
pub use models::{Email, EmailId};
pub use rules::{
    Action, Age, Condition, ConditionValue, Field, Operator, Outcome, Predicate, Rule, combine,
    evaluate, load_rules_file, parse_rules,
};
pub use storage::{EmailStore, InMemoryEmailStore, SqliteEmailStore};
pub use sync::{SyncStats, sync_inbox};
