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
//! Source location tracking for parser

use nom_locate::LocatedSpan;

/// Type alias for located spans in the input
pub type Span<'a> = LocatedSpan<&'a str>;

/// A value with source location information
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    /// The value
    pub value: T,
    /// Start byte offset in the input
    pub start: usize,
    /// End byte offset in the input
    pub end: usize,
    /// 1-based line of the start
    pub line: usize,
    /// 0-based column of the start, in characters
    pub column: usize,
}

impl<T> Spanned<T> {
    /// Whether `next` starts exactly where this value ends
    pub fn touches<U>(&self, next: &Spanned<U>) -> bool {
        self.end == next.start
    }
}

/// Helper functions for working with spans
pub mod helpers {
    use super::*;

    /// Get the position offset from a span
    pub fn position(span: &Span<'_>) -> usize {
        span.location_offset()
    }

    /// Get the line number from a span (1-indexed)
    pub fn line(span: &Span<'_>) -> usize {
        span.location_line() as usize
    }

    /// Get the column number from a span (0-indexed)
    pub fn column(span: &Span<'_>) -> usize {
        span.get_utf8_column() - 1
    }

    /// Create a spanned value from a span and value
    pub fn spanned<T>(start: &Span<'_>, end: &Span<'_>, value: T) -> Spanned<T> {
        Spanned {
            value,
            start: position(start),
            end: position(end),
            line: line(start),
            column: column(start),
        }
    }
}
