//! # Conditions
//!
//! Declarative attribute conditions attached to a policy.
//!
//! A condition maps operator names to `field -> expected value` maps:
//!
//! ```json
//! {
//!   "StringEquals": { "status": "draft" },
//!   "NumberGreaterThan": { "total": 100 }
//! }
//! ```
//!
//! Every predicate under every operator must hold. A field missing from
//! the resource, or holding a value of the wrong JSON type, fails its
//! predicate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{PolicyError, PolicyResult};
use crate::resource::FieldMap;

/// Comparison operators available in a condition block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConditionOperator {
    /// String equality.
    StringEquals,
    /// String inequality.
    StringNotEquals,
    /// Numeric `==`.
    NumberEquals,
    /// Numeric `!=`.
    NumberNotEquals,
    /// Numeric `>`.
    NumberGreaterThan,
    /// Numeric `>=`.
    NumberGreaterThanEquals,
    /// Numeric `<`.
    NumberLessThan,
    /// Numeric `<=`.
    NumberLessThanEquals,
    /// Boolean equality.
    Bool,
}

/// JSON type an operator compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Bool,
}

impl OperandKind {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperandKind::String => "string",
            OperandKind::Number => "number",
            OperandKind::Bool => "boolean",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            OperandKind::String => value.is_string(),
            OperandKind::Number => value.is_number(),
            OperandKind::Bool => value.is_boolean(),
        }
    }
}

impl ConditionOperator {
    /// Get the operator name as written in policies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::StringEquals => "StringEquals",
            ConditionOperator::StringNotEquals => "StringNotEquals",
            ConditionOperator::NumberEquals => "NumberEquals",
            ConditionOperator::NumberNotEquals => "NumberNotEquals",
            ConditionOperator::NumberGreaterThan => "NumberGreaterThan",
            ConditionOperator::NumberGreaterThanEquals => "NumberGreaterThanEquals",
            ConditionOperator::NumberLessThan => "NumberLessThan",
            ConditionOperator::NumberLessThanEquals => "NumberLessThanEquals",
            ConditionOperator::Bool => "Bool",
        }
    }

    /// Get the operand type this operator compares.
    pub fn operand_kind(&self) -> OperandKind {
        match self {
            ConditionOperator::StringEquals | ConditionOperator::StringNotEquals => {
                OperandKind::String
            }
            ConditionOperator::Bool => OperandKind::Bool,
            _ => OperandKind::Number,
        }
    }

    /// Test one predicate: `actual <op> expected`.
    ///
    /// Returns `false` whenever either side is not of the operator's type.
    ///
    /// # Example
    ///
    /// ```
    /// use platform_policy::condition::ConditionOperator;
    /// use serde_json::json;
    ///
    /// assert!(ConditionOperator::NumberGreaterThan.test(&json!(2), &json!(1)));
    /// assert!(!ConditionOperator::NumberGreaterThan.test(&json!("2"), &json!(1)));
    /// assert!(ConditionOperator::StringNotEquals.test(&json!("a"), &json!("b")));
    /// ```
    pub fn test(&self, actual: &Value, expected: &Value) -> bool {
        match self.operand_kind() {
            OperandKind::String => match (actual.as_str(), expected.as_str()) {
                (Some(a), Some(e)) => match self {
                    ConditionOperator::StringEquals => a == e,
                    _ => a != e,
                },
                _ => false,
            },
            OperandKind::Bool => match (actual.as_bool(), expected.as_bool()) {
                (Some(a), Some(e)) => a == e,
                _ => false,
            },
            OperandKind::Number => match compare_numbers(actual, expected) {
                Some(ordering) => match self {
                    ConditionOperator::NumberEquals => ordering == Ordering::Equal,
                    ConditionOperator::NumberNotEquals => ordering != Ordering::Equal,
                    ConditionOperator::NumberGreaterThan => ordering == Ordering::Greater,
                    ConditionOperator::NumberGreaterThanEquals => ordering != Ordering::Less,
                    ConditionOperator::NumberLessThan => ordering == Ordering::Less,
                    _ => ordering != Ordering::Greater,
                },
                None => false,
            },
        }
    }
}

/// Order two JSON numbers. Integers compare exactly; anything else
/// falls back to `f64`. `None` when either side is not a number.
fn compare_numbers(actual: &Value, expected: &Value) -> Option<Ordering> {
    if let (Some(a), Some(e)) = (actual.as_i64(), expected.as_i64()) {
        return Some(a.cmp(&e));
    }
    if let (Some(a), Some(e)) = (actual.as_u64(), expected.as_u64()) {
        return Some(a.cmp(&e));
    }
    actual.as_f64()?.partial_cmp(&expected.as_f64()?)
}

/// An attribute condition block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition {
    predicates: BTreeMap<ConditionOperator, BTreeMap<String, Value>>,
}

impl Condition {
    /// Create an empty condition (always satisfied).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `field <op> expected` predicate.
    pub fn with(
        mut self,
        operator: ConditionOperator,
        field: impl Into<String>,
        expected: impl Into<Value>,
    ) -> Self {
        self.predicates
            .entry(operator)
            .or_default()
            .insert(field.into(), expected.into());
        self
    }

    /// Iterate over every `(operator, field, expected)` predicate.
    pub fn predicates(&self) -> impl Iterator<Item = (ConditionOperator, &str, &Value)> {
        self.predicates.iter().flat_map(|(op, fields)| {
            fields
                .iter()
                .map(move |(field, expected)| (*op, field.as_str(), expected))
        })
    }

    /// Check if the condition has no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.values().all(BTreeMap::is_empty)
    }

    /// Check whether a resource satisfies every predicate.
    pub fn satisfies(&self, resource: &FieldMap) -> bool {
        self.predicates().all(|(op, field, expected)| {
            resource
                .get(field)
                .is_some_and(|actual| op.test(actual, expected))
        })
    }

    /// Check that every operand has the JSON type its operator compares.
    pub fn validate(&self) -> PolicyResult<()> {
        for (op, field, expected) in self.predicates() {
            let kind = op.operand_kind();
            if !kind.accepts(expected) {
                return Err(PolicyError::InvalidConditionOperand {
                    operator: op.as_str(),
                    field: field.to_string(),
                    expected: kind.as_str(),
                });
            }
        }
        Ok(())
    }
}

/// Evaluate an optional condition; `None` is always satisfied.
pub fn satisfies(condition: Option<&Condition>, resource: &FieldMap) -> bool {
    condition.map_or(true, |c| c.satisfies(resource))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_none_is_satisfied() {
        assert!(satisfies(None, &FieldMap::new()));
    }

    #[test]
    fn test_deserialize_operator_names() {
        let condition: Condition = serde_json::from_value(json!({
            "StringEquals": { "foo": "bar" },
            "NumberGreaterThan": { "n": 1 },
        }))
        .unwrap();
        assert_eq!(condition.predicates().count(), 2);

        let unknown = serde_json::from_value::<Condition>(json!({ "StringLike": { "a": "b" } }));
        assert!(unknown.is_err());
    }

    #[test]
    fn test_and_composition() {
        let condition = Condition::new()
            .with(ConditionOperator::StringEquals, "foo", "bar")
            .with(ConditionOperator::NumberGreaterThan, "n", 1);

        assert!(condition.satisfies(&FieldMap::new().with("foo", "bar").with("n", 2)));
        assert!(!condition.satisfies(&FieldMap::new().with("foo", "baz").with("n", 2)));
        assert!(!condition.satisfies(&FieldMap::new().with("foo", "bar").with("n", 1)));
    }

    #[test]
    fn test_missing_field_fails_every_operator() {
        let resource = FieldMap::new();
        for op in [
            ConditionOperator::StringEquals,
            ConditionOperator::StringNotEquals,
            ConditionOperator::NumberNotEquals,
            ConditionOperator::Bool,
        ] {
            let expected = match op.operand_kind() {
                OperandKind::String => json!("x"),
                OperandKind::Number => json!(1),
                OperandKind::Bool => json!(false),
            };
            let condition = Condition::new().with(op, "missing", expected);
            assert!(!condition.satisfies(&resource), "{} should fail", op.as_str());
        }
    }

    #[test]
    fn test_number_operators() {
        let three = json!(3);
        let cases = [
            (ConditionOperator::NumberEquals, json!(3.0), true),
            (ConditionOperator::NumberNotEquals, json!(3), false),
            (ConditionOperator::NumberGreaterThan, json!(3), false),
            (ConditionOperator::NumberGreaterThanEquals, json!(3), true),
            (ConditionOperator::NumberLessThan, json!(4), true),
            (ConditionOperator::NumberLessThanEquals, json!(2.5), false),
        ];
        for (op, expected, outcome) in cases {
            assert_eq!(op.test(&three, &expected), outcome, "{}", op.as_str());
        }
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let actual = json!(9_007_199_254_740_992_u64);
        let expected = json!(9_007_199_254_740_993_u64);
        assert!(!ConditionOperator::NumberEquals.test(&actual, &expected));
        assert!(ConditionOperator::NumberLessThan.test(&actual, &expected));

        let max = json!(u64::MAX);
        assert!(ConditionOperator::NumberGreaterThan.test(&max, &json!(u64::MAX - 1)));
        assert!(ConditionOperator::NumberGreaterThan.test(&max, &json!(-1)));
        assert!(ConditionOperator::NumberLessThanEquals.test(&json!(1), &json!(1.5)));
    }

    #[test]
    fn test_type_mismatch_fails() {
        assert!(!ConditionOperator::NumberEquals.test(&json!("3"), &json!(3)));
        assert!(!ConditionOperator::StringNotEquals.test(&json!(3), &json!("3")));
        assert!(!ConditionOperator::Bool.test(&json!("true"), &json!(true)));
        assert!(ConditionOperator::Bool.test(&json!(false), &json!(false)));
    }

    #[test]
    fn test_validate_operands() {
        let ok = Condition::new()
            .with(ConditionOperator::Bool, "archived", false)
            .with(ConditionOperator::NumberLessThan, "size", 10);
        assert!(ok.validate().is_ok());

        let bad = Condition::new().with(ConditionOperator::NumberLessThan, "size", "10");
        assert_eq!(
            bad.validate(),
            Err(PolicyError::InvalidConditionOperand {
                operator: "NumberLessThan",
                field: "size".to_string(),
                expected: "number",
            })
        );
    }

    #[test]
    fn test_empty_condition() {
        let condition: Condition = serde_json::from_value(json!({})).unwrap();
        assert!(condition.is_empty());
        assert!(condition.satisfies(&FieldMap::new()));
    }
}
