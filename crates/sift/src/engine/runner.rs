//! Rule engine: emails × rules → dispatched actions

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use rayon::prelude::*;

use super::{CancelToken, RunSummary};
use crate::actions::{FailurePolicy, MailService, dispatch};
use crate::models::Email;
use crate::rules::{Rule, combine, evaluate};

/// Whether `rule` fires for `email`
pub fn rule_matches(rule: &Rule, email: &Email, now: DateTime<Utc>) -> bool {
    combine(
        rule.predicate,
        rule.conditions.iter().map(|c| evaluate(c, email, now)),
    )
}

/// Indexes of the rules that fire for `email`, in rule order
fn matching_rules(rules: &[Rule], email: &Email, now: DateTime<Utc>) -> Vec<usize> {
    rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule_matches(rule, email, now))
        .map(|(i, _)| i)
        .collect()
}

/// Evaluates every rule against every email and dispatches on match
///
/// Each (email, rule) pair is independent: an email may match several
/// rules, and each match dispatches its own actions. Within one email,
/// matched rules dispatch in rule-file order.
pub struct RuleEngine {
    service: Arc<dyn MailService>,
    policy: FailurePolicy,
    cancel: CancelToken,
}

impl RuleEngine {
    pub fn new(service: Arc<dyn MailService>) -> Self {
        Self {
            service,
            policy: FailurePolicy::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use `token` to stop the run between emails
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run sequentially, measuring ages from the current time
    pub fn run(&self, emails: &[Email], rules: &[Rule]) -> RunSummary {
        self.run_at(emails, rules, Utc::now())
    }

    /// Run sequentially with a fixed clock
    pub fn run_at(&self, emails: &[Email], rules: &[Rule], now: DateTime<Utc>) -> RunSummary {
        info!(
            "Applying {} rules to {} emails",
            rules.len(),
            emails.len()
        );
        self.dispatch_matches(emails, rules, |_, email| matching_rules(rules, email, now))
    }

    /// Evaluate in parallel, then dispatch in the same order as [`run`](Self::run)
    pub fn run_parallel(&self, emails: &[Email], rules: &[Rule]) -> RunSummary {
        self.run_parallel_at(emails, rules, Utc::now())
    }

    /// Parallel evaluation with a fixed clock
    pub fn run_parallel_at(
        &self,
        emails: &[Email],
        rules: &[Rule],
        now: DateTime<Utc>,
    ) -> RunSummary {
        info!(
            "Applying {} rules to {} emails (parallel evaluation)",
            rules.len(),
            emails.len()
        );
        let mut plan: Vec<Vec<usize>> = emails
            .par_iter()
            .map(|email| matching_rules(rules, email, now))
            .collect();

        self.dispatch_matches(emails, rules, |i, _| std::mem::take(&mut plan[i]))
    }

    fn dispatch_matches<F>(&self, emails: &[Email], rules: &[Rule], mut matches: F) -> RunSummary
    where
        F: FnMut(usize, &Email) -> Vec<usize>,
    {
        let mut summary = RunSummary::default();

        'emails: for (i, email) in emails.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("Run cancelled after {} emails", summary.emails_processed);
                summary.cancelled = true;
                break;
            }
            summary.emails_processed += 1;

            for rule_idx in matches(i, email) {
                let rule = &rules[rule_idx];
                summary.rules_matched += 1;
                debug!(
                    "Rule {} ({}) matched email {}",
                    rule.index, rule.predicate, email.id
                );

                let report = dispatch(&email.id, &rule.actions, self.service.as_ref(), self.policy);
                summary.absorb(report);

                if summary.aborted {
                    info!("Run aborted on first mail service failure");
                    break 'emails;
                }
            }
        }

        info!("{}", summary);
        summary
    }
}
