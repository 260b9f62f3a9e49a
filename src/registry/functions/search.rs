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
//! search() function - regular expression search

use super::matches::regex_test;
use super::regex_cache::MatchMode;
use crate::registry::function::{FilterValue, FunctionExtension};
use crate::typing::ExpressionType;

/// search() function - whether any substring matches an I-Regexp
pub struct SearchFunction;

impl FunctionExtension for SearchFunction {
    fn argument_types(&self) -> &[ExpressionType] {
        &[ExpressionType::Value, ExpressionType::Value]
    }

    fn return_type(&self) -> ExpressionType {
        ExpressionType::Logical
    }

    fn documentation(&self) -> &str {
        "Tests whether the first argument, a string, contains a substring matching the I-Regexp given as the second argument."
    }

    fn evaluate<'a>(&self, arguments: Vec<FilterValue<'a>>) -> FilterValue<'a> {
        FilterValue::Logical(regex_test(&arguments, MatchMode::Search))
    }
}
