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

//! Static type system for filter expressions
//!
//! Every filter sub-expression has exactly one of three types. The rules in
//! this module decide where each type may appear and how a value of one type
//! is converted when a position statically requires another.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a filter expression, known before evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpressionType {
    /// A single JSON value, or Nothing
    Value,
    /// A boolean test result
    Logical,
    /// An ordered, possibly empty, list of nodes
    Nodes,
}

impl ExpressionType {
    /// Convert a value of this type to `target`, if the conversion is allowed.
    ///
    /// Nodes convert to Value through a runtime reduction (exactly one node
    /// is required) and to Logical through existence. No other conversion
    /// between distinct types exists.
    pub fn coerce_to(self, target: ExpressionType) -> Option<ExpressionType> {
        use ExpressionType::*;

        match (self, target) {
            (Value, Value) | (Nodes, Value) => Some(Value),
            (Logical, Logical) | (Nodes, Logical) => Some(Logical),
            (Nodes, Nodes) => Some(Nodes),
            _ => None,
        }
    }

    /// Whether an expression of this type may stand alone as a test
    pub fn is_valid_in_test_context(self) -> bool {
        matches!(self, ExpressionType::Logical | ExpressionType::Nodes)
    }

    /// Whether an expression of this type may be a comparison operand
    pub fn is_valid_in_comparison_context(self) -> bool {
        matches!(self, ExpressionType::Value | ExpressionType::Nodes)
    }

    /// Result type of a comparison or of a logical combination
    pub const fn combined() -> ExpressionType {
        ExpressionType::Logical
    }

    /// Name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionType::Value => "ValueType",
            ExpressionType::Logical => "LogicalType",
            ExpressionType::Nodes => "NodesType",
        }
    }
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a type list the way diagnostics print signatures
pub fn format_type_list(types: &[ExpressionType]) -> String {
    types
        .iter()
        .map(ExpressionType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::ExpressionType::*;
    use super::*;

    #[test]
    fn test_coercion_table() {
        assert_eq!(Value.coerce_to(Value), Some(Value));
        assert_eq!(Nodes.coerce_to(Value), Some(Value));
        assert_eq!(Logical.coerce_to(Value), None);

        assert_eq!(Logical.coerce_to(Logical), Some(Logical));
        assert_eq!(Nodes.coerce_to(Logical), Some(Logical));
        assert_eq!(Value.coerce_to(Logical), None);

        assert_eq!(Nodes.coerce_to(Nodes), Some(Nodes));
        assert_eq!(Value.coerce_to(Nodes), None);
        assert_eq!(Logical.coerce_to(Nodes), None);
    }

    #[test]
    fn test_context_rules() {
        assert!(Logical.is_valid_in_test_context());
        assert!(Nodes.is_valid_in_test_context());
        assert!(!Value.is_valid_in_test_context());

        assert!(Value.is_valid_in_comparison_context());
        assert!(Nodes.is_valid_in_comparison_context());
        assert!(!Logical.is_valid_in_comparison_context());
    }

    #[test]
    fn test_display() {
        assert_eq!(format_type_list(&[Value, Nodes]), "ValueType, NodesType");
        assert_eq!(Logical.to_string(), "LogicalType");
    }
}
