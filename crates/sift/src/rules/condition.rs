//! Condition evaluation
//!
//! A condition never fails. Anything the engine cannot interpret (unknown
//! field or operator, a value of the wrong type) evaluates to
//! [`Outcome::NotApplicable`] so one bad condition cannot abort a run.
//! Ages too large for the calendar clamp to its earliest or latest instant.

use chrono::{DateTime, Duration, Utc};
use log::trace;

use super::model::{Age, Condition, ConditionValue, Field, Operator};
use crate::models::Email;

/// Result of testing one condition against one email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Match,
    NoMatch,
    /// The condition does not apply to this field/operator/value combination
    NotApplicable,
}

impl From<bool> for Outcome {
    fn from(matched: bool) -> Self {
        if matched { Self::Match } else { Self::NoMatch }
    }
}

/// Evaluate `condition` against `email`, measuring ages relative to `now`
pub fn evaluate(condition: &Condition, email: &Email, now: DateTime<Utc>) -> Outcome {
    let outcome = match &condition.field {
        Field::Sender => compare_text(&email.sender, &condition.operator, &condition.value),
        Field::Subject => compare_text(&email.subject, &condition.operator, &condition.value),
        Field::Received => {
            compare_age(email.received_at, now, &condition.operator, &condition.value)
        }
        Field::Other(_) => Outcome::NotApplicable,
    };

    if outcome == Outcome::NotApplicable {
        trace!(
            "Condition {:?} {:?} not applicable to email {}",
            condition.field, condition.operator, email.id
        );
    }

    outcome
}

impl Condition {
    /// Shorthand for [`evaluate`]
    pub fn evaluate(&self, email: &Email, now: DateTime<Utc>) -> Outcome {
        evaluate(self, email, now)
    }
}

fn compare_text(actual: &str, operator: &Operator, value: &ConditionValue) -> Outcome {
    let ConditionValue::Text(expected) = value else {
        return Outcome::NotApplicable;
    };

    let actual = actual.to_lowercase();
    let expected = expected.to_lowercase();

    match operator {
        Operator::Contains => actual.contains(&expected).into(),
        Operator::NotContains => (!actual.contains(&expected)).into(),
        Operator::Equals => (actual == expected).into(),
        Operator::NotEquals => (actual != expected).into(),
        Operator::YoungerThan | Operator::Other(_) => Outcome::NotApplicable,
    }
}

fn compare_age(
    received_at: DateTime<Utc>,
    now: DateTime<Utc>,
    operator: &Operator,
    value: &ConditionValue,
) -> Outcome {
    if *operator != Operator::YoungerThan {
        return Outcome::NotApplicable;
    }
    let ConditionValue::Age(age) = value else {
        return Outcome::NotApplicable;
    };

    (received_at > cutoff(now, *age)).into()
}

/// `now - age`, clamped to the representable range
fn cutoff(now: DateTime<Utc>, age: Age) -> DateTime<Utc> {
    let days = age.days();
    Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(if days >= 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailId;

    fn make_email(sender: &str, subject: &str, age_days: i64, now: DateTime<Utc>) -> Email {
        Email::builder(EmailId::new("m1"))
            .sender(sender)
            .subject(subject)
            .received_at(now - Duration::days(age_days))
            .build()
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let now = Utc::now();
        let email = make_email("Ads <ads@NewsLetter.com>", "Weekly digest", 0, now);

        let cond = Condition::text(Field::Sender, Operator::Contains, "newsletter");
        assert_eq!(evaluate(&cond, &email, now), Outcome::Match);

        let cond = Condition::text(Field::Sender, Operator::NotContains, "NEWSLETTER");
        assert_eq!(evaluate(&cond, &email, now), Outcome::NoMatch);

        let cond = Condition::text(Field::Subject, Operator::NotContains, "invoice");
        assert_eq!(evaluate(&cond, &email, now), Outcome::Match);
    }

    #[test]
    fn test_equals_is_case_insensitive() {
        let now = Utc::now();
        let email = make_email("billing@example.com", "invoice", 0, now);

        let cond = Condition::text(Field::Subject, Operator::Equals, "Invoice");
        assert_eq!(evaluate(&cond, &email, now), Outcome::Match);

        let cond = Condition::text(Field::Subject, Operator::NotEquals, "INVOICE");
        assert_eq!(evaluate(&cond, &email, now), Outcome::NoMatch);

        let cond = Condition::text(Field::Subject, Operator::Equals, "Invoice #12");
        assert_eq!(evaluate(&cond, &email, now), Outcome::NoMatch);
    }

    #[test]
    fn test_younger_than_days() {
        let now = Utc::now();
        let cond = Condition::younger_than(Age::Days(7));

        let recent = make_email("a@example.com", "Hi", 3, now);
        assert_eq!(evaluate(&cond, &recent, now), Outcome::Match);

        let old = make_email("a@example.com", "Hi", 10, now);
        assert_eq!(evaluate(&cond, &old, now), Outcome::NoMatch);
    }

    #[test]
    fn test_younger_than_months() {
        let now = Utc::now();
        let cond = Condition::younger_than(Age::Months(1));

        let email = make_email("a@example.com", "Hi", 10, now);
        assert_eq!(evaluate(&cond, &email, now), Outcome::Match);

        let email = make_email("a@example.com", "Hi", 31, now);
        assert_eq!(evaluate(&cond, &email, now), Outcome::NoMatch);
    }

    #[test]
    fn test_younger_than_boundary_is_strict() {
        let now = Utc::now();
        let cond = Condition::younger_than(Age::Days(7));
        let email = make_email("a@example.com", "Hi", 7, now);

        assert_eq!(evaluate(&cond, &email, now), Outcome::NoMatch);
    }

    #[test]
    fn test_unknown_field_not_applicable() {
        let now = Utc::now();
        let email = make_email("a@example.com", "Hi", 0, now);
        let cond = Condition::text(Field::Other("cc".into()), Operator::Contains, "a");

        assert_eq!(evaluate(&cond, &email, now), Outcome::NotApplicable);
    }

    #[test]
    fn test_mismatched_operator_not_applicable() {
        let now = Utc::now();
        let email = make_email("a@example.com", "Hi", 0, now);

        // younger-than on a text field
        let cond = Condition::text(Field::Subject, Operator::YoungerThan, "7");
        assert_eq!(evaluate(&cond, &email, now), Outcome::NotApplicable);

        // contains on received
        let cond = Condition::new(
            Field::Received,
            Operator::Contains,
            ConditionValue::Age(Age::Days(7)),
        );
        assert_eq!(evaluate(&cond, &email, now), Outcome::NotApplicable);

        let cond = Condition::text(Field::Sender, Operator::Other("matches".into()), "a");
        assert_eq!(evaluate(&cond, &email, now), Outcome::NotApplicable);
    }

    #[test]
    fn test_mismatched_value_not_applicable() {
        let now = Utc::now();
        let email = make_email("a@example.com", "Hi", 0, now);

        let cond = Condition::new(Field::Sender, Operator::Contains, ConditionValue::Invalid);
        assert_eq!(evaluate(&cond, &email, now), Outcome::NotApplicable);

        let cond = Condition::new(
            Field::Received,
            Operator::YoungerThan,
            ConditionValue::Text("soon".into()),
        );
        assert_eq!(evaluate(&cond, &email, now), Outcome::NotApplicable);
    }

    #[test]
    fn test_huge_age_matches_everything() {
        let now = Utc::now();
        let email = make_email("a@example.com", "Hi", 3, now);

        for age in [
            Age::Days(100_000_000),
            Age::Days(i64::MAX),
            Age::Months(i64::MAX / 2),
        ] {
            let cond = Condition::younger_than(age);
            assert_eq!(evaluate(&cond, &email, now), Outcome::Match, "{:?}", age);
        }
    }

    #[test]
    fn test_huge_negative_age_matches_nothing() {
        let now = Utc::now();
        let email = make_email("a@example.com", "Hi", 0, now);
        let cond = Condition::younger_than(Age::Days(i64::MIN));

        assert_eq!(evaluate(&cond, &email, now), Outcome::NoMatch);
    }
}
