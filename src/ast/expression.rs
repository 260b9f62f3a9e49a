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
//! Filter expression parse tree

use super::SourceSpan;
use super::operator::ComparisonOperator;
use super::query::QueryNode;
use serde_json::Value;

/// A parsed filter expression with its location
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionNode {
    /// What the expression is
    pub kind: ExpressionKind,
    /// Location in the source text
    pub span: SourceSpan,
}

/// Parsed filter expression variants
///
/// The tree is untyped. Types are assigned by the compiler, which is also
/// where context rules (what may stand as a test, what may be compared) are
/// enforced.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    /// Number, string, `true`, `false` or `null`
    Literal(Value),
    /// Relative or absolute query
    Query(QueryNode),
    /// Function extension call
    FunctionCall {
        /// Function name
        name: String,
        /// Arguments in source order
        arguments: Vec<ExpressionNode>,
    },
    /// Binary comparison
    Comparison {
        /// The operator
        operator: ComparisonOperator,
        /// Left operand
        left: Box<ExpressionNode>,
        /// Right operand
        right: Box<ExpressionNode>,
    },
    /// `!` operand
    Not(Box<ExpressionNode>),
    /// Operands joined by `&&`
    And(Vec<ExpressionNode>),
    /// Operands joined by `||`
    Or(Vec<ExpressionNode>),
    /// Parenthesized expression
    Paren(Box<ExpressionNode>),
}

impl ExpressionNode {
    /// Create a new expression node
    pub fn new(kind: ExpressionKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }

    /// Function name, if this node is a function call
    pub fn function_name(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::FunctionCall { name, .. } => Some(name),
            _ => None,
        }
    }
}
