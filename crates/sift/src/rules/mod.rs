//! User-defined classification rules
//!
//! - `model`: typed rules, conditions and actions
//! - `loader`: rule-file JSON parsing
//! - `condition`: three-state condition evaluation
//! - `predicate`: ALL/ANY combination of outcomes

mod condition;
mod loader;
mod model;
mod predicate;

pub use condition::{Outcome, evaluate};
pub use loader::{load_rules_file, parse_rules};
pub use model::{
    Action, Age, Condition, ConditionValue, DAYS_PER_MONTH, Field, Operator, Predicate, Rule,
};
pub use predicate::combine;
