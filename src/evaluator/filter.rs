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

//! Filter expression evaluation
//!
//! Each expression is evaluated according to the position it stands in:
//! as a test, as a comparison operand or as a function argument of a
//! declared type. The compiler has already rejected every combination that
//! has no meaning, so the fallbacks here are never reached by a compiled
//! plan.

use super::Evaluator;
use super::comparison::{Comparable, compare};
use crate::ast::{LogicalOperator, QueryRoot};
use crate::compiler::{FilterExpression, FilterExpressionKind, FilterQuery};
use crate::registry::FilterValue;
use crate::typing::ExpressionType;
use serde_json::Value;
use std::borrow::Cow;

impl Evaluator {
    /// Evaluate `expression` as a test against the `current` node
    pub(crate) fn test<'v>(
        &self,
        expression: &'v FilterExpression,
        root: &'v Value,
        current: &'v Value,
    ) -> bool {
        match &expression.kind {
            FilterExpressionKind::Query(query) => !self.query(query, root, current).is_empty(),
            FilterExpressionKind::Comparison {
                operator,
                left,
                right,
            } => compare(
                *operator,
                &self.comparable(left, root, current),
                &self.comparable(right, root, current),
            ),
            FilterExpressionKind::Logical { operator, operands } => match operator {
                LogicalOperator::And => operands
                    .iter()
                    .all(|operand| self.test(operand, root, current)),
                LogicalOperator::Or => operands
                    .iter()
                    .any(|operand| self.test(operand, root, current)),
                LogicalOperator::Not => !operands
                    .iter()
                    .any(|operand| self.test(operand, root, current)),
            },
            FilterExpressionKind::FunctionCall { .. } => {
                match self.call(expression, root, current) {
                    FilterValue::Logical(result) => result,
                    FilterValue::Nodes(nodes) => !nodes.is_empty(),
                    FilterValue::Value(_) => false,
                }
            }
            FilterExpressionKind::Literal(_) => false,
        }
    }

    fn comparable<'v>(
        &self,
        expression: &'v FilterExpression,
        root: &'v Value,
        current: &'v Value,
    ) -> Comparable<'v> {
        match &expression.kind {
            FilterExpressionKind::Literal(value) => Comparable::Value(Cow::Borrowed(value)),
            FilterExpressionKind::Query(query) => {
                Comparable::from_nodes(&self.query(query, root, current))
            }
            FilterExpressionKind::FunctionCall { .. } => {
                match self.call(expression, root, current) {
                    FilterValue::Value(Some(value)) => Comparable::Value(value),
                    FilterValue::Nodes(nodes) => Comparable::from_nodes(&nodes),
                    FilterValue::Value(None) | FilterValue::Logical(_) => Comparable::Nothing,
                }
            }
            FilterExpressionKind::Comparison { .. } | FilterExpressionKind::Logical { .. } => {
                Comparable::Nothing
            }
        }
    }

    /// Values selected by a filter sub-query
    fn query<'v>(&self, query: &FilterQuery, root: &'v Value, current: &'v Value) -> Vec<&'v Value> {
        let start = match query.root {
            QueryRoot::Root => root,
            QueryRoot::Current => current,
        };
        self.select(&query.segments, root, vec![((), start)])
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }

    /// Invoke a function extension with its arguments converted to the
    /// declared parameter types
    ///
    /// A node list that does not reduce to exactly one value for a value
    /// parameter makes the whole call produce the empty value of its return
    /// type, without invoking the function.
    fn call<'v>(
        &self,
        expression: &'v FilterExpression,
        root: &'v Value,
        current: &'v Value,
    ) -> FilterValue<'v> {
        let FilterExpressionKind::FunctionCall {
            name,
            function,
            arguments,
            argument_types,
        } = &expression.kind
        else {
            return FilterValue::empty_of(expression.expression_type);
        };
        let return_type = function.return_type();

        let mut values = Vec::with_capacity(arguments.len());
        for (argument, declared) in arguments.iter().zip(argument_types) {
            match self.argument(argument, *declared, root, current) {
                Some(value) => values.push(value),
                None => {
                    log::trace!("argument of {name} does not reduce to {declared}");
                    return FilterValue::empty_of(return_type);
                }
            }
        }

        let result = function.evaluate(values);
        if result.expression_type() != return_type {
            log::warn!(
                "function extension {name} returned {} but declares {return_type}",
                result.expression_type()
            );
            return FilterValue::empty_of(return_type);
        }
        result
    }

    fn argument<'v>(
        &self,
        argument: &'v FilterExpression,
        declared: ExpressionType,
        root: &'v Value,
        current: &'v Value,
    ) -> Option<FilterValue<'v>> {
        match declared {
            ExpressionType::Value => match &argument.kind {
                FilterExpressionKind::Literal(value) => Some(FilterValue::borrowed(value)),
                FilterExpressionKind::Query(query) => {
                    single(self.query(query, root, current)).map(FilterValue::borrowed)
                }
                FilterExpressionKind::FunctionCall { .. } => {
                    match self.call(argument, root, current) {
                        FilterValue::Nodes(nodes) => single(nodes).map(FilterValue::borrowed),
                        FilterValue::Logical(_) => None,
                        value => Some(value),
                    }
                }
                FilterExpressionKind::Comparison { .. } | FilterExpressionKind::Logical { .. } => {
                    None
                }
            },
            ExpressionType::Logical => Some(FilterValue::Logical(
                self.test(argument, root, current),
            )),
            ExpressionType::Nodes => match &argument.kind {
                FilterExpressionKind::Query(query) => {
                    Some(FilterValue::Nodes(self.query(query, root, current)))
                }
                FilterExpressionKind::FunctionCall { .. } => {
                    match self.call(argument, root, current) {
                        nodes @ FilterValue::Nodes(_) => Some(nodes),
                        _ => None,
                    }
                }
                _ => None,
            },
        }
    }
}

fn single(nodes: Vec<&Value>) -> Option<&Value> {
    match nodes.as_slice() {
        [node] => Some(*node),
        _ => None,
    }
}
