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

//! Semantic analysis of a parse tree
//!
//! Walks the tree bottom-up, assigns every filter expression its type,
//! resolves function extensions and checks the context rules. Findings go to
//! the error listener and are counted; analysis always continues with the
//! siblings of a failing node so a single pass reports every problem.

use super::plan::{FilterExpression, FilterExpressionKind, FilterQuery, Segment, Selector};
use crate::ast::{
    ExpressionKind, ExpressionNode, LogicalOperator, QueryNode, SegmentNode, SelectorNode,
};
use crate::diagnostics::{CoercedArgument, ErrorListener};
use crate::registry::RepositorySnapshot;
use crate::typing::ExpressionType;

/// Single-use analysis pass over one query
pub(crate) struct Analyzer<'a> {
    source: &'a str,
    repository: &'a RepositorySnapshot,
    listener: &'a dyn ErrorListener,
    reported: usize,
}

impl<'a> Analyzer<'a> {
    pub(crate) fn new(
        source: &'a str,
        repository: &'a RepositorySnapshot,
        listener: &'a dyn ErrorListener,
    ) -> Self {
        Self {
            source,
            repository,
            listener,
            reported: 0,
        }
    }

    /// Number of diagnostics reported so far
    pub(crate) fn reported(&self) -> usize {
        self.reported
    }

    fn report(&mut self, emit: impl FnOnce(&dyn ErrorListener)) {
        self.reported += 1;
        emit(self.listener);
    }

    fn text(&self, node: &ExpressionNode) -> &'a str {
        node.span.text(self.source)
    }

    /// Compile the segments of a query
    ///
    /// Every segment is analyzed even after a failure; `None` means at least
    /// one of them failed.
    pub(crate) fn compile_segments(&mut self, query: &QueryNode) -> Option<Vec<Segment>> {
        let segments: Vec<Option<Segment>> = query
            .segments
            .iter()
            .map(|segment| self.compile_segment(segment))
            .collect();
        segments.into_iter().collect()
    }

    fn compile_segment(&mut self, segment: &SegmentNode) -> Option<Segment> {
        let selectors: Vec<Option<Selector>> = segment
            .selectors
            .iter()
            .map(|selector| self.compile_selector(selector))
            .collect();
        Some(Segment {
            kind: segment.kind,
            selectors: selectors.into_iter().collect::<Option<_>>()?,
        })
    }

    fn compile_selector(&mut self, selector: &SelectorNode) -> Option<Selector> {
        Some(match selector {
            SelectorNode::Name(name) => Selector::Name(name.clone()),
            SelectorNode::Index(index) => Selector::Index(*index),
            SelectorNode::Wildcard => Selector::Wildcard,
            SelectorNode::Slice(bounds) => Selector::Slice(*bounds),
            SelectorNode::Filter(predicate) => {
                Selector::Filter(Box::new(self.compile_test(predicate)?))
            }
        })
    }

    /// Compile an expression that stands as a test
    fn compile_test(&mut self, node: &ExpressionNode) -> Option<FilterExpression> {
        let compiled = self.compile_expression(node)?;
        if !compiled.expression_type.is_valid_in_test_context() {
            match &node.kind {
                ExpressionKind::FunctionCall { name, .. } => self.report(|listener| {
                    listener.invalid_function_extension_for_test_expression(name)
                }),
                _ => {
                    let text = self.text(node);
                    self.report(|listener| listener.invalid_test_expression(text));
                }
            }
        }
        Some(compiled)
    }

    /// Compile an operand of a comparison
    fn compile_comparable(&mut self, node: &ExpressionNode) -> Option<FilterExpression> {
        let compiled = self.compile_expression(node)?;
        if !compiled.expression_type.is_valid_in_comparison_context() {
            match &node.kind {
                ExpressionKind::FunctionCall { name, .. } => self.report(|listener| {
                    listener.invalid_function_extension_for_comparable(name)
                }),
                _ => {
                    let text = self.text(node);
                    self.report(|listener| listener.invalid_test_expression(text));
                }
            }
        }
        Some(compiled)
    }

    /// Compile an expression and assign its natural type
    fn compile_expression(&mut self, node: &ExpressionNode) -> Option<FilterExpression> {
        match &node.kind {
            ExpressionKind::Literal(value) => Some(FilterExpression::new(
                FilterExpressionKind::Literal(value.clone()),
                ExpressionType::Value,
            )),
            ExpressionKind::Query(query) => {
                let segments = self.compile_segments(query)?;
                Some(FilterExpression::new(
                    FilterExpressionKind::Query(FilterQuery {
                        root: query.root,
                        segments,
                    }),
                    ExpressionType::Nodes,
                ))
            }
            ExpressionKind::FunctionCall { name, arguments } => {
                self.compile_function_call(name, arguments)
            }
            ExpressionKind::Comparison {
                operator,
                left,
                right,
            } => {
                let left = self.compile_comparable(left);
                let right = self.compile_comparable(right);
                Some(FilterExpression::new(
                    FilterExpressionKind::Comparison {
                        operator: *operator,
                        left: Box::new(left?),
                        right: Box::new(right?),
                    },
                    ExpressionType::combined(),
                ))
            }
            ExpressionKind::Not(operand) => {
                self.compile_logical(LogicalOperator::Not, std::slice::from_ref(&**operand))
            }
            ExpressionKind::And(operands) => self.compile_logical(LogicalOperator::And, operands),
            ExpressionKind::Or(operands) => self.compile_logical(LogicalOperator::Or, operands),
            ExpressionKind::Paren(inner) => {
                let inner = self.compile_test(inner)?;
                Some(FilterExpression::new(inner.kind, ExpressionType::combined()))
            }
        }
    }

    fn compile_logical(
        &mut self,
        operator: LogicalOperator,
        operands: &[ExpressionNode],
    ) -> Option<FilterExpression> {
        let operands: Vec<Option<FilterExpression>> = operands
            .iter()
            .map(|operand| self.compile_test(operand))
            .collect();
        Some(FilterExpression::new(
            FilterExpressionKind::Logical {
                operator,
                operands: operands.into_iter().collect::<Option<_>>()?,
            },
            ExpressionType::combined(),
        ))
    }

    fn compile_function_call(
        &mut self,
        name: &str,
        arguments: &[ExpressionNode],
    ) -> Option<FilterExpression> {
        let compiled: Vec<Option<FilterExpression>> = arguments
            .iter()
            .map(|argument| self.compile_expression(argument))
            .collect();

        let Some(function) = self.repository.lookup(name) else {
            self.report(|listener| listener.unknown_function_extension(name));
            return None;
        };
        // An argument that failed has already been reported
        let compiled: Vec<FilterExpression> = compiled.into_iter().collect::<Option<_>>()?;

        let declared = function.argument_types().to_vec();
        let actual: Vec<CoercedArgument> = compiled
            .iter()
            .zip(arguments)
            .enumerate()
            .map(|(position, (argument, node))| {
                let expression_type = match declared.get(position) {
                    Some(target) => argument.expression_type.coerce_to(*target),
                    None => Some(argument.expression_type),
                };
                CoercedArgument::new(expression_type, self.text(node))
            })
            .collect();

        let fits = actual.len() == declared.len()
            && actual.iter().all(|argument| argument.expression_type.is_some());
        if !fits {
            self.report(|listener| {
                listener.invalid_arglist_for_function_extension(name, &declared, &actual)
            });
        }

        let return_type = function.return_type();
        Some(FilterExpression::new(
            FilterExpressionKind::FunctionCall {
                name: name.to_string(),
                function,
                arguments: compiled,
                argument_types: declared,
            },
            return_type,
        ))
    }
}
