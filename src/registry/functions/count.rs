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
//! count() function - number of nodes in a node list

use crate::registry::function::{FilterValue, FunctionExtension};
use crate::typing::ExpressionType;
use serde_json::Value;

/// count() function - returns the number of nodes in the argument
pub struct CountFunction;

impl FunctionExtension for CountFunction {
    fn argument_types(&self) -> &[ExpressionType] {
        &[ExpressionType::Nodes]
    }

    fn return_type(&self) -> ExpressionType {
        ExpressionType::Value
    }

    fn documentation(&self) -> &str {
        "Returns the number of nodes in the node list argument."
    }

    fn evaluate<'a>(&self, arguments: Vec<FilterValue<'a>>) -> FilterValue<'a> {
        match arguments.first().and_then(FilterValue::as_nodes) {
            Some(nodes) => FilterValue::owned(Value::from(nodes.len())),
            None => FilterValue::nothing(),
        }
    }
}
