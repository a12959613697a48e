//! Typed rule definitions
//!
//! Everything here is produced once by the loader. Condition values and
//! action strings are already resolved, so evaluation never re-inspects raw
//! JSON.

use std::fmt;

/// Days per month when a `received` value is given in months
pub const DAYS_PER_MONTH: i64 = 30;

/// Email attribute a condition tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Sender,
    Subject,
    Received,
    /// Any field the engine does not understand (e.g., "cc")
    Other(String),
}

impl Field {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "sender" => Self::Sender,
            "subject" => Self::Subject,
            "received" => Self::Received,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Whether the field holds free text (sender/subject)
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Sender | Self::Subject)
    }
}

/// Comparison a condition applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Contains,
    NotContains,
    Equals,
    NotEquals,
    /// Email age is strictly less than the given duration
    YoungerThan,
    Other(String),
}

impl Operator {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "contains" => Self::Contains,
            "does not contain" | "not-contains" | "not contains" => Self::NotContains,
            "equals" => Self::Equals,
            "does not equal" | "not-equals" | "not equals" => Self::NotEquals,
            "less than" | "younger-than" | "younger than" => Self::YoungerThan,
            _ => Self::Other(s.to_string()),
        }
    }
}

/// Age threshold for `received` conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Age {
    Days(i64),
    Months(i64),
}

impl Age {
    /// Total length in days (months count as 30 days), saturating
    pub fn days(self) -> i64 {
        match self {
            Self::Days(d) => d,
            Self::Months(m) => m.saturating_mul(DAYS_PER_MONTH),
        }
    }
}

/// Resolved condition operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionValue {
    Text(String),
    Age(Age),
    /// Value whose type does not fit the field; always not-applicable
    Invalid,
}

/// One field/operator/value test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: Field,
    pub operator: Operator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(field: Field, operator: Operator, value: ConditionValue) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    pub fn text(field: Field, operator: Operator, value: impl Into<String>) -> Self {
        Self::new(field, operator, ConditionValue::Text(value.into()))
    }

    pub fn younger_than(age: Age) -> Self {
        Self::new(Field::Received, Operator::YoungerThan, ConditionValue::Age(age))
    }
}

/// How a rule's condition outcomes are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    All,
    Any,
}

impl Predicate {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "any" => Some(Self::Any),
            _ => None,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Any => f.write_str("any"),
        }
    }
}

/// State change requested for a matching email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MarkRead,
    MarkUnread,
    MoveToLabel(String),
}

impl Action {
    /// Parse a rule-file action string; `None` for anything unrecognized
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "mark as read" => return Some(Self::MarkRead),
            "mark as unread" => return Some(Self::MarkUnread),
            _ => {}
        }

        if lower.starts_with("move:") {
            let label = s["move:".len()..].trim();
            if !label.is_empty() {
                return Some(Self::MoveToLabel(label.to_string()));
            }
        }

        None
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkRead => f.write_str("mark as read"),
            Self::MarkUnread => f.write_str("mark as unread"),
            Self::MoveToLabel(label) => write!(f, "move:{}", label),
        }
    }
}

/// Conditions, predicate and actions, evaluated independently per email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Position in the rule file (0-based)
    pub index: usize,
    pub conditions: Vec<Condition>,
    pub predicate: Predicate,
    pub actions: Vec<Action>,
}

impl Rule {
    pub fn new(predicate: Predicate, conditions: Vec<Condition>, actions: Vec<Action>) -> Self {
        Self {
            index: 0,
            conditions,
            predicate,
            actions,
        }
    }
}
