//! Action dispatch for a matched email

use log::{debug, warn};

use super::MailService;
use crate::error::MailServiceError;
use crate::models::EmailId;
use crate::rules::Action;

/// What to do when a mail-service call fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and keep going
    #[default]
    Isolate,
    /// Stop at the first failure
    Abort,
}

/// Outcome of dispatching one action list
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Calls that succeeded
    pub dispatched: usize,
    pub failures: Vec<MailServiceError>,
    /// True when a failure stopped dispatch under [`FailurePolicy::Abort`]
    pub aborted: bool,
}

/// Run `actions` against `email_id` in order
///
/// Every action is its own call; there is no grouping or rollback, and
/// contradictory actions (read then unread) both execute.
pub fn dispatch(
    email_id: &EmailId,
    actions: &[Action],
    service: &dyn MailService,
    policy: FailurePolicy,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for action in actions {
        match service.apply(email_id, action) {
            Ok(()) => {
                debug!("Applied '{}' to email {}", action, email_id);
                report.dispatched += 1;
            }
            Err(e) => {
                let failure = MailServiceError::new(email_id.clone(), action.clone(), &e);
                warn!("{}", failure);
                report.failures.push(failure);

                if policy == FailurePolicy::Abort {
                    report.aborted = true;
                    break;
                }
            }
        }
    }

    report
}
