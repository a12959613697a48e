//! Error types surfaced by rule loading and action dispatch

use std::path::PathBuf;

use crate::models::EmailId;
use crate::rules::Action;

/// Error raised while loading a rule file
///
/// Any of these aborts a run before evaluation starts.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Failed to read rule file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rule ({location}): {reason}")]
    InvalidRule { location: String, reason: String },
}

impl RuleError {
    pub(crate) fn invalid(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// A single mail-service call that failed during dispatch
#[derive(Debug, Clone, thiserror::Error)]
#[error("'{action}' failed for email {email_id}: {message}")]
pub struct MailServiceError {
    pub email_id: EmailId,
    pub action: Action,
    pub message: String,
}

impl MailServiceError {
    pub fn new(email_id: EmailId, action: Action, err: &anyhow::Error) -> Self {
        Self {
            email_id,
            action,
            message: format!("{:#}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_rule_display() {
        let err = RuleError::invalid("rule 2", "unknown predicate 'some'");
        assert_eq!(
            err.to_string(),
            "Invalid rule (rule 2): unknown predicate 'some'"
        );
    }

    #[test]
    fn test_mail_service_error_keeps_context_chain() {
        let err = anyhow::anyhow!("connection reset").context("Failed to send modify request");
        let failure = MailServiceError::new(EmailId::new("m1"), Action::MarkRead, &err);

        assert_eq!(
            failure.to_string(),
            "'mark as read' failed for email m1: Failed to send modify request: connection reset"
        );
    }
}
