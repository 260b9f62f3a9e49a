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
//! Diagnostic values reported while compiling a JSONPath expression

use crate::typing::{ExpressionType, format_type_list};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::ErrorListener;

/// An actual function argument as seen by the argument-list check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercedArgument {
    /// Type after conversion to the declared parameter type, `None` if no
    /// conversion exists
    pub expression_type: Option<ExpressionType>,
    /// Source text of the argument
    pub text: String,
}

impl CoercedArgument {
    /// Create a new coerced argument record
    pub fn new(expression_type: Option<ExpressionType>, text: impl Into<String>) -> Self {
        Self {
            expression_type,
            text: text.into(),
        }
    }
}

impl fmt::Display for CoercedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expression_type {
            Some(expression_type) => write!(f, "{expression_type}"),
            None => f.write_str("none"),
        }
    }
}

/// A single compile-time finding
///
/// Values of this type are data only. How they are presented is up to the
/// [`ErrorListener`] that receives them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A function call names no registered function extension
    #[error("Unknown JSONPath function extension: \"{name}\"")]
    UnknownFunctionExtension {
        /// Function name as written
        name: String,
    },

    /// A function returning a value was used as a test expression
    #[error("Invalid JSONPath function extension return type for test expression: \"{name}\"")]
    InvalidFunctionExtensionForTestExpression {
        /// Function name
        name: String,
    },

    /// A function returning a logical result was used as a comparison operand
    #[error(
        "Invalid JSONPath function extension return type for comparable expression: \"{name}\""
    )]
    InvalidFunctionExtensionForComparable {
        /// Function name
        name: String,
    },

    /// The actual arguments do not fit the declared parameter list
    #[error(
        "Invalid arguments for function extension \"{name}\": Expected: <{}>, but received <{}>: <{}>",
        format_type_list(.expected),
        join(.actual, |argument| argument.to_string()),
        join(.actual, |argument| argument.text.clone())
    )]
    InvalidArglistForFunctionExtension {
        /// Function name
        name: String,
        /// Declared parameter types
        expected: Vec<ExpressionType>,
        /// Actual arguments with their coerced types
        actual: Vec<CoercedArgument>,
    },

    /// A test expression that is neither a query, a logical expression nor a
    /// suitable function call
    #[error("Invalid test expression: {text}")]
    InvalidTestExpression {
        /// Offending source text
        text: String,
    },

    /// The source text does not follow the grammar
    #[error("Syntax error {line}:{column} {message}")]
    SyntaxError {
        /// 1-based line
        line: usize,
        /// 0-based column
        column: usize,
        /// What went wrong
        message: String,
        /// Text of the offending token, if any
        offending_symbol: Option<String>,
    },
}

fn join(arguments: &[CoercedArgument], render: impl Fn(&CoercedArgument) -> String) -> String {
    arguments.iter().map(render).collect::<Vec<_>>().join(", ")
}

impl Diagnostic {
    /// Deliver this diagnostic to the matching listener operation
    pub fn dispatch(&self, listener: &dyn ErrorListener) {
        match self {
            Diagnostic::UnknownFunctionExtension { name } => {
                listener.unknown_function_extension(name)
            }
            Diagnostic::InvalidFunctionExtensionForTestExpression { name } => {
                listener.invalid_function_extension_for_test_expression(name)
            }
            Diagnostic::InvalidFunctionExtensionForComparable { name } => {
                listener.invalid_function_extension_for_comparable(name)
            }
            Diagnostic::InvalidArglistForFunctionExtension {
                name,
                expected,
                actual,
            } => listener.invalid_arglist_for_function_extension(name, expected, actual),
            Diagnostic::InvalidTestExpression { text } => listener.invalid_test_expression(text),
            Diagnostic::SyntaxError {
                line,
                column,
                message,
                offending_symbol,
            } => listener.syntax_error(*line, *column, message, offending_symbol.as_deref()),
        }
    }

    /// Whether this diagnostic came from the grammar rather than from
    /// semantic analysis
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Diagnostic::SyntaxError { .. })
    }
}
