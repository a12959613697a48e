//! Rule engine orchestration

mod cancel;
mod runner;
mod summary;

pub use cancel::CancelToken;
pub use runner::{RuleEngine, rule_matches};
pub use summary::RunSummary;
