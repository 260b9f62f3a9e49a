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
//! Built-in function extensions

pub mod count;
pub mod length;
pub mod matches;
pub mod regex_cache;
pub mod search;
pub mod value;

pub use count::CountFunction;
pub use length::LengthFunction;
pub use matches::MatchFunction;
pub use search::SearchFunction;
pub use value::ValueFunction;

use super::function::FunctionExtension;
use std::sync::Arc;

/// The fixed reference set every repository can be seeded with
pub fn builtins() -> Vec<(&'static str, Arc<dyn FunctionExtension>)> {
    let builtins: [(&'static str, Arc<dyn FunctionExtension>); 5] = [
        ("length", Arc::new(LengthFunction)),
        ("count", Arc::new(CountFunction)),
        ("match", Arc::new(MatchFunction)),
        ("search", Arc::new(SearchFunction)),
        ("value", Arc::new(ValueFunction)),
    ];
    builtins.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typing::ExpressionType;

    #[test]
    fn test_builtins_are_documented() {
        for (name, function) in builtins() {
            assert!(!function.documentation().is_empty(), "{name} has no documentation");
        }
    }

    #[test]
    fn test_builtin_signatures() {
        let signatures: Vec<_> = builtins()
            .into_iter()
            .map(|(name, function)| {
                (name, function.argument_types().to_vec(), function.return_type())
            })
            .collect();
        assert_eq!(
            signatures,
            vec![
                ("length", vec![ExpressionType::Value], ExpressionType::Value),
                ("count", vec![ExpressionType::Nodes], ExpressionType::Value),
                (
                    "match",
                    vec![ExpressionType::Value, ExpressionType::Value],
                    ExpressionType::Logical
                ),
                (
                    "search",
                    vec![ExpressionType::Value, ExpressionType::Value],
                    ExpressionType::Logical
                ),
                ("value", vec![ExpressionType::Nodes], ExpressionType::Value),
            ]
        );
    }
}
