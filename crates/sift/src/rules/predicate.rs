//! ALL/ANY reduction of condition outcomes

use super::condition::Outcome;
use super::model::Predicate;

/// Reduce condition outcomes to a single match decision
///
/// Not-applicable outcomes are dropped first. With nothing left, `All` is
/// vacuously true and `Any` is false.
pub fn combine<I>(predicate: Predicate, outcomes: I) -> bool
where
    I: IntoIterator<Item = Outcome>,
{
    let mut applicable = outcomes
        .into_iter()
        .filter(|o| *o != Outcome::NotApplicable);

    match predicate {
        Predicate::All => applicable.all(|o| o == Outcome::Match),
        Predicate::Any => applicable.any(|o| o == Outcome::Match),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Outcome::*;

    #[test]
    fn test_all_requires_every_match() {
        assert!(combine(Predicate::All, [Match, Match]));
        assert!(!combine(Predicate::All, [Match, NoMatch]));
    }

    #[test]
    fn test_any_requires_one_match() {
        assert!(combine(Predicate::Any, [NoMatch, Match]));
        assert!(!combine(Predicate::Any, [NoMatch, NoMatch]));
    }

    #[test]
    fn test_all_with_nothing_applicable_is_vacuously_true() {
        assert!(combine(Predicate::All, Vec::<Outcome>::new()));
        assert!(combine(Predicate::All, [NotApplicable, NotApplicable]));
    }

    #[test]
    fn test_any_with_nothing_applicable_is_false() {
        assert!(!combine(Predicate::Any, Vec::<Outcome>::new()));
        assert!(!combine(Predicate::Any, [NotApplicable]));
    }

    #[test]
    fn test_not_applicable_is_ignored() {
        assert!(combine(Predicate::All, [Match, NotApplicable]));
        assert!(!combine(Predicate::All, [NoMatch, NotApplicable]));
        assert!(combine(Predicate::Any, [NotApplicable, Match]));
        assert!(!combine(Predicate::Any, [NotApplicable, NoMatch]));
    }
}
