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
//! length() function - size of a string, array or object

use crate::registry::function::{FilterValue, FunctionExtension};
use crate::typing::ExpressionType;
use serde_json::Value;

/// length() function - number of characters, elements or members
pub struct LengthFunction;

impl FunctionExtension for LengthFunction {
    fn argument_types(&self) -> &[ExpressionType] {
        &[ExpressionType::Value]
    }

    fn return_type(&self) -> ExpressionType {
        ExpressionType::Value
    }

    fn documentation(&self) -> &str {
        "Returns the number of Unicode scalar values of a string, the number of elements of an array or the number of members of an object. Any other argument yields Nothing."
    }

    fn evaluate<'a>(&self, arguments: Vec<FilterValue<'a>>) -> FilterValue<'a> {
        let length = match arguments.first().and_then(FilterValue::as_value) {
            Some(Value::String(text)) => text.chars().count(),
            Some(Value::Array(items)) => items.len(),
            Some(Value::Object(members)) => members.len(),
            _ => return FilterValue::nothing(),
        };
        FilterValue::owned(Value::from(length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn length_of(value: Value) -> FilterValue<'static> {
        LengthFunction.evaluate(vec![FilterValue::owned(value)])
    }

    #[test]
    fn test_length_counts_scalar_values() {
        assert_eq!(length_of(json!("héllo")).as_value(), Some(&json!(5)));
        assert_eq!(length_of(json!([1, 2, 3])).as_value(), Some(&json!(3)));
        assert_eq!(length_of(json!({"a": 1})).as_value(), Some(&json!(1)));
    }

    #[test]
    fn test_length_of_other_values_is_nothing() {
        assert!(length_of(json!(42)).is_nothing());
        assert!(length_of(json!(null)).is_nothing());
        assert!(LengthFunction.evaluate(vec![FilterValue::nothing()]).is_nothing());
    }
}
