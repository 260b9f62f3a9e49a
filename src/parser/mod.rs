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
//! JSONPath parser
//!
//! Turns query text into the untyped parse tree in [`crate::ast`]. Only the
//! grammar is checked here; typing rules belong to the compiler.

pub mod error;
pub mod pratt;
pub mod span;
pub mod tokenizer;

pub use error::{ParseResult, SyntaxError};
pub use span::{Span, Spanned};

use crate::ast::QueryNode;
use crate::config::CompilerConfig;

/// Parse a JSONPath query into its parse tree
pub fn parse(source: &str, config: &CompilerConfig) -> ParseResult<QueryNode> {
    let tokens = tokenizer::tokenize(source)?;
    pratt::Parser::new(source, tokens, config.max_nesting_depth).parse_query()
}
