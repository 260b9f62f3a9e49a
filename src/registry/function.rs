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

//! Function extension contract and runtime filter values

use crate::typing::ExpressionType;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Runtime value of a filter sub-expression
///
/// Each variant corresponds to one [`ExpressionType`]. `Value(None)` is the
/// special Nothing value produced by empty node lists and failed functions.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue<'a> {
    /// A single JSON value, or Nothing
    Value(Option<Cow<'a, Value>>),
    /// A boolean test result
    Logical(bool),
    /// Nodes selected from the document
    Nodes(Vec<&'a Value>),
}

impl<'a> FilterValue<'a> {
    /// The Nothing value
    pub fn nothing() -> Self {
        FilterValue::Value(None)
    }

    /// Wrap a value computed by a function
    pub fn owned(value: Value) -> Self {
        FilterValue::Value(Some(Cow::Owned(value)))
    }

    /// Wrap a value borrowed from the document
    pub fn borrowed(value: &'a Value) -> Self {
        FilterValue::Value(Some(Cow::Borrowed(value)))
    }

    /// The falsy or empty value of the given type
    pub fn empty_of(expression_type: ExpressionType) -> Self {
        match expression_type {
            ExpressionType::Value => FilterValue::nothing(),
            ExpressionType::Logical => FilterValue::Logical(false),
            ExpressionType::Nodes => FilterValue::Nodes(Vec::new()),
        }
    }

    /// Type tag of this value
    pub fn expression_type(&self) -> ExpressionType {
        match self {
            FilterValue::Value(_) => ExpressionType::Value,
            FilterValue::Logical(_) => ExpressionType::Logical,
            FilterValue::Nodes(_) => ExpressionType::Nodes,
        }
    }

    /// The JSON value, if this is a Value that is not Nothing
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FilterValue::Value(Some(value)) => Some(value.as_ref()),
            _ => None,
        }
    }

    /// The JSON string, if this is a string Value
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// The boolean, if this is a Logical
    pub fn as_logical(&self) -> Option<bool> {
        match self {
            FilterValue::Logical(result) => Some(*result),
            _ => None,
        }
    }

    /// The nodes, if this is a Nodes value
    pub fn as_nodes(&self) -> Option<&[&'a Value]> {
        match self {
            FilterValue::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }

    /// Whether this is the Nothing value
    pub fn is_nothing(&self) -> bool {
        matches!(self, FilterValue::Value(None))
    }
}

/// A named, statically typed function usable inside filter expressions
///
/// The compiler checks every call against [`argument_types`](Self::argument_types)
/// and [`return_type`](Self::return_type) before the function is ever invoked.
/// At evaluation time each argument arrives already converted to the declared
/// type of its position, and the function must answer with a value of its
/// declared return type.
pub trait FunctionExtension: Send + Sync {
    /// Declared parameter types, positionally
    fn argument_types(&self) -> &[ExpressionType];

    /// Declared return type
    fn return_type(&self) -> ExpressionType;

    /// Evaluate the function over already converted arguments
    fn evaluate<'a>(&self, arguments: Vec<FilterValue<'a>>) -> FilterValue<'a>;

    /// One-line description shown by `octofhir-jsonpath functions`
    fn documentation(&self) -> &str {
        ""
    }
}

impl fmt::Debug for dyn FunctionExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionExtension")
            .field("argument_types", &self.argument_types())
            .field("return_type", &self.return_type())
            .finish()
    }
}

/// Function extension backed by a closure
pub struct FnExtension<F> {
    argument_types: Vec<ExpressionType>,
    return_type: ExpressionType,
    function: F,
}

impl<F> FunctionExtension for FnExtension<F>
where
    F: for<'a> Fn(Vec<FilterValue<'a>>) -> FilterValue<'a> + Send + Sync,
{
    fn argument_types(&self) -> &[ExpressionType] {
        &self.argument_types
    }

    fn return_type(&self) -> ExpressionType {
        self.return_type
    }

    fn evaluate<'a>(&self, arguments: Vec<FilterValue<'a>>) -> FilterValue<'a> {
        (self.function)(arguments)
    }
}

/// Build a function extension from a closure
///
/// ```
/// use octofhir_jsonpath::registry::{FilterValue, FunctionExtension, function_extension};
/// use octofhir_jsonpath::typing::ExpressionType;
///
/// let is_even = function_extension(
///     [ExpressionType::Value],
///     ExpressionType::Logical,
///     |args| {
///         let even = args[0]
///             .as_value()
///             .and_then(|v| v.as_i64())
///             .is_some_and(|n| n % 2 == 0);
///         FilterValue::Logical(even)
///     },
/// );
/// assert_eq!(is_even.argument_types(), &[ExpressionType::Value]);
/// ```
pub fn function_extension<F>(
    argument_types: impl Into<Vec<ExpressionType>>,
    return_type: ExpressionType,
    function: F,
) -> Arc<dyn FunctionExtension>
where
    F: for<'a> Fn(Vec<FilterValue<'a>>) -> FilterValue<'a> + Send + Sync + 'static,
{
    Arc::new(FnExtension {
        argument_types: argument_types.into(),
        return_type,
        function,
    })
}
