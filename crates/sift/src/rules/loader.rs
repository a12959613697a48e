//! Rule file loading
//!
//! The rule file is a JSON array of rule objects:
//!
//! ```json
//! [
//!   {
//!     "conditions": [{"field": "sender", "operator": "contains", "value": "newsletter"}],
//!     "predicate": "all",
//!     "actions": ["mark as read", "move:Label_1"]
//!   }
//! ]
//! ```
//!
//! Structural problems (missing keys, unknown predicate, non-object
//! conditions) are rejected with [`RuleError::InvalidRule`]. Problems inside
//! a condition object are not errors: the condition is kept and evaluates as
//! not-applicable. Unrecognized action strings are skipped.

use std::path::Path;

use log::{debug, warn};
use serde_json::{Map, Value};

use super::model::{Action, Age, Condition, ConditionValue, Field, Operator, Predicate, Rule};
use crate::error::RuleError;

/// Load and parse a rule file from disk
pub fn load_rules_file(path: &Path) -> Result<Vec<Rule>, RuleError> {
    let content = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = parse_rules(&content)?;
    debug!("Loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}

/// Parse rule-file JSON
pub fn parse_rules(json: &str) -> Result<Vec<Rule>, RuleError> {
    let root: Value = serde_json::from_str(json)
        .map_err(|e| RuleError::invalid("rule file", format!("not valid JSON: {}", e)))?;

    let Value::Array(entries) = root else {
        return Err(RuleError::invalid(
            "rule file",
            "expected a JSON array of rules",
        ));
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_rule(index, entry))
        .collect()
}

fn parse_rule(index: usize, entry: &Value) -> Result<Rule, RuleError> {
    let location = format!("rule {}", index);
    let obj = entry
        .as_object()
        .ok_or_else(|| RuleError::invalid(&location, "rule must be an object"))?;

    let raw_conditions = required(obj, "conditions", &location)?
        .as_array()
        .ok_or_else(|| RuleError::invalid(&location, "'conditions' must be an array"))?;

    let raw_predicate = required(obj, "predicate", &location)?
        .as_str()
        .ok_or_else(|| RuleError::invalid(&location, "'predicate' must be a string"))?;
    let predicate = Predicate::parse(raw_predicate).ok_or_else(|| {
        RuleError::invalid(&location, format!("unknown predicate '{}'", raw_predicate))
    })?;

    let raw_actions = required(obj, "actions", &location)?
        .as_array()
        .ok_or_else(|| RuleError::invalid(&location, "'actions' must be an array"))?;

    let conditions = raw_conditions
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            raw.as_object().map(parse_condition).ok_or_else(|| {
                RuleError::invalid(
                    format!("{}, condition {}", location, i),
                    "condition must be an object",
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut actions = Vec::with_capacity(raw_actions.len());
    for (i, raw) in raw_actions.iter().enumerate() {
        let raw = raw.as_str().ok_or_else(|| {
            RuleError::invalid(
                format!("{}, action {}", location, i),
                "action must be a string",
            )
        })?;
        match Action::parse(raw) {
            Some(action) => actions.push(action),
            None => warn!("Skipping unrecognized action '{}' in {}", raw, location),
        }
    }

    Ok(Rule {
        index,
        conditions,
        predicate,
        actions,
    })
}

fn required<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    location: &str,
) -> Result<&'a Value, RuleError> {
    obj.get(key)
        .ok_or_else(|| RuleError::invalid(location, format!("missing '{}'", key)))
}

/// Build a condition from its JSON object, degrading bad parts to
/// `Other`/`Invalid` instead of failing
fn parse_condition(obj: &Map<String, Value>) -> Condition {
    let field = match obj.get("field").and_then(Value::as_str) {
        Some(s) => Field::parse(s),
        None => Field::Other(String::new()),
    };
    let operator = match obj.get("operator").and_then(Value::as_str) {
        Some(s) => Operator::parse(s),
        None => Operator::Other(String::new()),
    };
    let value = resolve_value(&field, obj.get("value"));

    Condition::new(field, operator, value)
}

/// Resolve the raw value against the field it will be compared with
///
/// `received` takes an integer (days) or a string holding an integer
/// (months). Text fields take a string.
fn resolve_value(field: &Field, raw: Option<&Value>) -> ConditionValue {
    match (field, raw) {
        (Field::Sender | Field::Subject, Some(Value::String(s))) => ConditionValue::Text(s.clone()),
        (Field::Received, Some(Value::Number(n))) => match n.as_i64() {
            Some(days) => ConditionValue::Age(Age::Days(days)),
            None => ConditionValue::Invalid,
        },
        (Field::Received, Some(Value::String(s))) => match s.trim().parse::<i64>() {
            Ok(months) => ConditionValue::Age(Age::Months(months)),
            Err(_) => ConditionValue::Invalid,
        },
        _ => ConditionValue::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(json: &str) -> Rule {
        let mut rules = parse_rules(json).unwrap();
        assert_eq!(rules.len(), 1);
        rules.remove(0)
    }

    fn assert_invalid(json: &str, needle: &str) {
        match parse_rules(json) {
            Err(RuleError::InvalidRule { reason, .. }) => {
                assert!(reason.contains(needle), "unexpected reason: {}", reason)
            }
            other => panic!("expected InvalidRule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_full_rule() {
        let rule = parse_one(
            r#"[{
                "conditions": [
                    {"field": "sender", "operator": "contains", "value": "newsletter"},
                    {"field": "subject", "operator": "does not equal", "value": "Receipt"},
                    {"field": "received", "operator": "less than", "value": 7},
                    {"field": "received", "operator": "less than", "value": "2"}
                ],
                "predicate": "any",
                "actions": ["mark as read", "move:Label_7"]
            }]"#,
        );

        assert_eq!(rule.index, 0);
        assert_eq!(rule.predicate, Predicate::Any);
        assert_eq!(
            rule.conditions,
            vec![
                Condition::text(Field::Sender, Operator::Contains, "newsletter"),
                Condition::text(Field::Subject, Operator::NotEquals, "Receipt"),
                Condition::younger_than(Age::Days(7)),
                Condition::younger_than(Age::Months(2)),
            ]
        );
        assert_eq!(
            rule.actions,
            vec![Action::MarkRead, Action::MoveToLabel("Label_7".to_string())]
        );
    }

    #[test]
    fn test_rule_indexes_follow_file_order() {
        let rules = parse_rules(
            r#"[
                {"conditions": [], "predicate": "all", "actions": []},
                {"conditions": [], "predicate": "any", "actions": []}
            ]"#,
        )
        .unwrap();

        assert_eq!(rules[0].index, 0);
        assert_eq!(rules[1].index, 1);
        assert_eq!(rules[1].predicate, Predicate::Any);
    }

    #[test]
    fn test_unknown_actions_are_skipped() {
        let rule = parse_one(
            r#"[{"conditions": [], "predicate": "all",
                 "actions": ["archive", "mark as unread", "move:", "star"]}]"#,
        );
        assert_eq!(rule.actions, vec![Action::MarkUnread]);
    }

    #[test]
    fn test_bad_condition_contents_degrade() {
        let rule = parse_one(
            r#"[{
                "conditions": [
                    {"field": "cc", "operator": "contains", "value": "boss"},
                    {"field": "subject", "operator": "contains", "value": 5},
                    {"field": "received", "operator": "less than", "value": "soon"},
                    {"field": "received", "operator": "less than", "value": 1.5},
                    {"operator": "contains", "value": "x"},
                    {}
                ],
                "predicate": "all",
                "actions": []
            }]"#,
        );

        assert_eq!(rule.conditions.len(), 6);
        assert_eq!(rule.conditions[0].field, Field::Other("cc".to_string()));
        assert_eq!(rule.conditions[1].value, ConditionValue::Invalid);
        assert_eq!(rule.conditions[2].value, ConditionValue::Invalid);
        assert_eq!(rule.conditions[3].value, ConditionValue::Invalid);
        assert_eq!(rule.conditions[4].field, Field::Other(String::new()));
        assert_eq!(rule.conditions[5].operator, Operator::Other(String::new()));
    }

    #[test]
    fn test_rejects_non_array_root() {
        assert_invalid(r#"{"conditions": []}"#, "JSON array");
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert_invalid("[{", "not valid JSON");
    }

    #[test]
    fn test_rejects_missing_keys() {
        assert_invalid(
            r#"[{"predicate": "all", "actions": []}]"#,
            "missing 'conditions'",
        );
        assert_invalid(
            r#"[{"conditions": [], "actions": []}]"#,
            "missing 'predicate'",
        );
        assert_invalid(
            r#"[{"conditions": [], "predicate": "all"}]"#,
            "missing 'actions'",
        );
    }

    #[test]
    fn test_rejects_unknown_predicate() {
        assert_invalid(
            r#"[{"conditions": [], "predicate": "most", "actions": []}]"#,
            "unknown predicate 'most'",
        );
    }

    #[test]
    fn test_rejects_non_object_condition() {
        assert_invalid(
            r#"[{"conditions": ["sender contains x"], "predicate": "all", "actions": []}]"#,
            "condition must be an object",
        );
    }

    #[test]
    fn test_rejects_non_string_action() {
        assert_invalid(
            r#"[{"conditions": [], "predicate": "all", "actions": [1]}]"#,
            "action must be a string",
        );
    }

    #[test]
    fn test_error_reports_rule_location() {
        let err = parse_rules(
            r#"[
                {"conditions": [], "predicate": "all", "actions": []},
                {"conditions": [], "predicate": "all", "actions": [], "extra": true},
                {"conditions": [42], "predicate": "all", "actions": []}
            ]"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("rule 2, condition 0"), "{}", err);
    }

    #[test]
    fn test_load_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"[{"conditions": [], "predicate": "all", "actions": ["mark as read"]}]"#,
        )
        .unwrap();

        let rules = load_rules_file(&path).unwrap();
        assert_eq!(rules.len(), 1);

        let missing = load_rules_file(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(RuleError::Io { .. })));
    }
}
