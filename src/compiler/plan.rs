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

//! Immutable query plan produced by the compiler

use crate::ast::{ComparisonOperator, LogicalOperator, QueryRoot, SegmentKind, SliceBounds};
use crate::registry::FunctionExtension;
use crate::typing::ExpressionType;
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// A compiled JSONPath query
///
/// Function extensions are resolved when the plan is built; later changes
/// to the repository do not affect an existing plan. The plan is immutable
/// and may be evaluated from many threads at once.
#[derive(Debug, Clone)]
pub struct CompiledPath {
    source: Arc<str>,
    segments: Vec<Segment>,
}

impl CompiledPath {
    pub(crate) fn new(source: &str, segments: Vec<Segment>) -> Self {
        Self {
            source: Arc::from(source),
            segments,
        }
    }

    /// Query text the plan was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Segments applied to the document root, in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A child or descendant step with its selectors
#[derive(Debug, Clone)]
pub struct Segment {
    /// Child or descendant
    pub kind: SegmentKind,
    /// Selectors in source order
    pub selectors: SmallVec<[Selector; 1]>,
}

/// A compiled selector
#[derive(Debug, Clone)]
pub enum Selector {
    /// Object member by name
    Name(String),
    /// Array element by index, negative counts from the end
    Index(i64),
    /// Every member or element
    Wildcard,
    /// Range of array elements
    Slice(SliceBounds),
    /// Children for which the predicate holds
    Filter(Box<FilterExpression>),
}

/// A typed filter expression
#[derive(Debug, Clone)]
pub struct FilterExpression {
    /// What the expression computes
    pub kind: FilterExpressionKind,
    /// Statically inferred type
    pub expression_type: ExpressionType,
}

/// Query inside a filter, relative to the current node or to the root
#[derive(Debug, Clone)]
pub struct FilterQuery {
    /// Starting node
    pub root: QueryRoot,
    /// Segments in source order
    pub segments: Vec<Segment>,
}

/// Compiled filter expression variants
#[derive(Debug, Clone)]
pub enum FilterExpressionKind {
    /// Constant JSON value
    Literal(Value),
    /// `@...` or `$...`
    Query(FilterQuery),
    /// Binary comparison of two comparables
    Comparison {
        /// The operator
        operator: ComparisonOperator,
        /// Left operand
        left: Box<FilterExpression>,
        /// Right operand
        right: Box<FilterExpression>,
    },
    /// `&&`, `||` over any number of operands, or `!` over exactly one
    Logical {
        /// The operator
        operator: LogicalOperator,
        /// Operands, each used as a test
        operands: Vec<FilterExpression>,
    },
    /// Call of a resolved function extension
    FunctionCall {
        /// Name the function was resolved under
        name: String,
        /// Implementation bound at compile time
        function: Arc<dyn FunctionExtension>,
        /// Arguments in source order
        arguments: Vec<FilterExpression>,
        /// Declared parameter types, captured with the function
        argument_types: Vec<ExpressionType>,
    },
}

impl FilterExpression {
    pub(crate) fn new(kind: FilterExpressionKind, expression_type: ExpressionType) -> Self {
        Self {
            kind,
            expression_type,
        }
    }
}
