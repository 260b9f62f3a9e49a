// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Comparison of filter operands

use crate::ast::ComparisonOperator;
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::cmp::Ordering;

/// A comparison operand after node list reduction
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Comparable<'v> {
    /// Empty node list or a function that produced nothing
    Nothing,
    /// Exactly one value
    Value(Cow<'v, Value>),
    /// A node list with more than one node
    Ambiguous,
}

impl<'v> Comparable<'v> {
    /// Reduce a node list to a comparable
    pub(crate) fn from_nodes(nodes: &[&'v Value]) -> Self {
        match nodes {
            [] => Comparable::Nothing,
            [single] => Comparable::Value(Cow::Borrowed(*single)),
            _ => Comparable::Ambiguous,
        }
    }
}

/// Apply a comparison operator
pub(crate) fn compare(operator: ComparisonOperator, left: &Comparable<'_>, right: &Comparable<'_>) -> bool {
    match operator {
        ComparisonOperator::Equal => equal(left, right),
        ComparisonOperator::NotEqual => !equal(left, right),
        ComparisonOperator::LessThan => less(left, right),
        ComparisonOperator::LessThanOrEqual => less(left, right) || equal(left, right),
        ComparisonOperator::GreaterThan => less(right, left),
        ComparisonOperator::GreaterThanOrEqual => less(right, left) || equal(left, right),
    }
}

fn equal(left: &Comparable<'_>, right: &Comparable<'_>) -> bool {
    match (left, right) {
        (Comparable::Nothing, Comparable::Nothing) => true,
        (Comparable::Value(left), Comparable::Value(right)) => json_equal(left, right),
        _ => false,
    }
}

fn less(left: &Comparable<'_>, right: &Comparable<'_>) -> bool {
    let (Comparable::Value(left), Comparable::Value(right)) = (left, right) else {
        return false;
    };
    match (left.as_ref(), right.as_ref()) {
        (Value::Number(left), Value::Number(right)) => {
            compare_numbers(left, right) == Some(Ordering::Less)
        }
        // UTF-8 byte order is Unicode scalar value order
        (Value::String(left), Value::String(right)) => left < right,
        _ => false,
    }
}

/// Deep equality with numeric comparison of numbers
pub(crate) fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => {
            compare_numbers(left, right) == Some(Ordering::Equal)
        }
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| json_equal(l, r))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(name, l)| right.get(name).is_some_and(|r| json_equal(l, r)))
        }
        _ => left == right,
    }
}

fn compare_numbers(left: &Number, right: &Number) -> Option<Ordering> {
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        return Some(left.cmp(&right));
    }
    if let (Some(left), Some(right)) = (left.as_u64(), right.as_u64()) {
        return Some(left.cmp(&right));
    }
    left.as_f64()?.partial_cmp(&right.as_f64()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ComparisonOperator::*;
    use serde_json::json;

    fn value(value: Value) -> Comparable<'static> {
        Comparable::Value(Cow::Owned(value))
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert!(compare(Equal, &value(json!(1)), &value(json!(1.0))));
        assert!(compare(LessThan, &value(json!(1)), &value(json!(1.5))));
        assert!(compare(GreaterThanOrEqual, &value(json!(2)), &value(json!(2.0))));
        assert!(!compare(LessThan, &value(json!(1)), &value(json!("2"))));
    }

    #[test]
    fn test_strings_compare_by_code_point() {
        assert!(compare(LessThan, &value(json!("a")), &value(json!("b"))));
        assert!(compare(LessThan, &value(json!("Z")), &value(json!("a"))));
        assert!(compare(LessThan, &value(json!("z")), &value(json!("é"))));
    }

    #[test]
    fn test_booleans_and_null_only_equal() {
        assert!(compare(Equal, &value(json!(true)), &value(json!(true))));
        assert!(!compare(LessThan, &value(json!(false)), &value(json!(true))));
        assert!(compare(LessThanOrEqual, &value(json!(null)), &value(json!(null))));
        assert!(!compare(LessThan, &value(json!(null)), &value(json!(null))));
    }

    #[test]
    fn test_structures_use_deep_equality() {
        assert!(compare(
            Equal,
            &value(json!({"a": [1, 2.0], "b": null})),
            &value(json!({"b": null, "a": [1.0, 2]}))
        ));
        assert!(compare(NotEqual, &value(json!([1, 2])), &value(json!([2, 1]))));
        assert!(!compare(LessThan, &value(json!([1])), &value(json!([2]))));
    }

    #[test]
    fn test_nothing() {
        assert!(compare(Equal, &Comparable::Nothing, &Comparable::Nothing));
        assert!(compare(LessThanOrEqual, &Comparable::Nothing, &Comparable::Nothing));
        assert!(!compare(Equal, &Comparable::Nothing, &value(json!(1))));
        assert!(compare(NotEqual, &value(json!(1)), &Comparable::Nothing));
    }

    #[test]
    fn test_ambiguous_never_equal() {
        let (first, second) = (json!(1), json!(1));
        let ambiguous = Comparable::from_nodes(&[&first, &second]);
        assert_eq!(ambiguous, Comparable::Ambiguous);
        assert!(!compare(Equal, &ambiguous, &ambiguous));
        assert!(compare(NotEqual, &ambiguous, &value(json!(1))));
        assert!(!compare(LessThanOrEqual, &ambiguous, &value(json!(2))));
    }
}
