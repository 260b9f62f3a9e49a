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
//! value() function - the value of a single node

use crate::registry::function::{FilterValue, FunctionExtension};
use crate::typing::ExpressionType;

/// value() function - converts a one-node list to its value
pub struct ValueFunction;

impl FunctionExtension for ValueFunction {
    fn argument_types(&self) -> &[ExpressionType] {
        &[ExpressionType::Nodes]
    }

    fn return_type(&self) -> ExpressionType {
        ExpressionType::Value
    }

    fn documentation(&self) -> &str {
        "Returns the value of the only node in the argument. Empty and multi-node lists yield Nothing."
    }

    fn evaluate<'a>(&self, arguments: Vec<FilterValue<'a>>) -> FilterValue<'a> {
        match arguments.first().and_then(FilterValue::as_nodes) {
            Some([node]) => FilterValue::borrowed(*node),
            _ => FilterValue::nothing(),
        }
    }
}
