//! Run statistics

use std::fmt;

use crate::actions::DispatchReport;
use crate::error::MailServiceError;

/// What a run did
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Emails whose rule loop started
    pub emails_processed: usize,
    /// Matching (email, rule) pairs
    pub rules_matched: usize,
    /// Mail-service calls that succeeded
    pub actions_dispatched: usize,
    /// Mail-service calls that failed, in order
    pub failures: Vec<MailServiceError>,
    /// Stopped early by a [`CancelToken`](super::CancelToken)
    pub cancelled: bool,
    /// Stopped early by a failure under `FailurePolicy::Abort`
    pub aborted: bool,
}

impl RunSummary {
    /// No failures and not aborted
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.aborted
    }

    pub(crate) fn absorb(&mut self, report: DispatchReport) {
        self.actions_dispatched += report.dispatched;
        self.failures.extend(report.failures);
        self.aborted |= report.aborted;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} emails: {} rule matches, {} actions dispatched, {} failures",
            self.emails_processed,
            self.rules_matched,
            self.actions_dispatched,
            self.failures.len()
        )?;
        if self.cancelled {
            f.write_str(" (cancelled)")?;
        }
        if self.aborted {
            f.write_str(" (aborted)")?;
        }
        Ok(())
    }
}
