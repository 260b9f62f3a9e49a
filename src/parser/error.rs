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
//! Parser error types

use super::span::{Span, helpers};
use crate::diagnostics::Diagnostic;
use nom::error::{ErrorKind, ParseError as NomParseError};
use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, SyntaxError>;

/// Rejected source text, with the position of the first offending token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Syntax error {line}:{column} {message}")]
pub struct SyntaxError {
    /// 1-based line
    pub line: usize,
    /// 0-based column
    pub column: usize,
    /// What went wrong
    pub message: String,
    /// Text of the offending token, `None` at end of input
    pub offending_symbol: Option<String>,
}

impl SyntaxError {
    /// Create a syntax error at an explicit position
    pub fn new(
        line: usize,
        column: usize,
        message: impl Into<String>,
        offending_symbol: Option<String>,
    ) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            offending_symbol,
        }
    }

    /// Create a syntax error at the start of `input`, blaming its first
    /// character
    pub fn at(input: &Span<'_>, message: impl Into<String>) -> Self {
        Self::new(
            helpers::line(input),
            helpers::column(input),
            message,
            input.fragment().chars().next().map(String::from),
        )
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::SyntaxError {
            line: self.line,
            column: self.column,
            message: self.message.clone(),
            offending_symbol: self.offending_symbol.clone(),
        }
    }
}

/// Implement nom's ParseError trait
impl<'a> NomParseError<Span<'a>> for SyntaxError {
    fn from_error_kind(input: Span<'a>, kind: ErrorKind) -> Self {
        let message = match input.fragment().chars().next() {
            Some(c) => format!("unexpected character '{}'", c.escape_default()),
            None => format!("unexpected end of input ({kind:?})"),
        };
        SyntaxError::at(&input, message)
    }

    fn append(_input: Span<'a>, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}
