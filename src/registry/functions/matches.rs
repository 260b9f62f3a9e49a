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
//! match() function - full regular expression match

use super::regex_cache::{MatchMode, compiled_regex};
use crate::registry::function::{FilterValue, FunctionExtension};
use crate::typing::ExpressionType;

/// match() function - whether the whole string matches an I-Regexp
pub struct MatchFunction;

impl FunctionExtension for MatchFunction {
    fn argument_types(&self) -> &[ExpressionType] {
        &[ExpressionType::Value, ExpressionType::Value]
    }

    fn return_type(&self) -> ExpressionType {
        ExpressionType::Logical
    }

    fn documentation(&self) -> &str {
        "Tests whether the first argument, a string, matches the I-Regexp given as the second argument in its entirety."
    }

    fn evaluate<'a>(&self, arguments: Vec<FilterValue<'a>>) -> FilterValue<'a> {
        FilterValue::Logical(regex_test(&arguments, MatchMode::Full))
    }
}

/// Shared by match() and search(): non-string operands and invalid patterns never match
pub(super) fn regex_test(arguments: &[FilterValue<'_>], mode: MatchMode) -> bool {
    let (Some(input), Some(pattern)) = (
        arguments.first().and_then(FilterValue::as_str),
        arguments.get(1).and_then(FilterValue::as_str),
    ) else {
        return false;
    };

    compiled_regex(pattern, mode).is_some_and(|regex| regex.is_match(input))
}
