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
//! Configuration for the compiler and the evaluator

use crate::error::JsonPathError;
use serde::{Deserialize, Serialize};

/// Default bound on filter expression nesting
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

/// Default bound on descendant traversal depth
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Compiler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Maximum nesting of parentheses, negations, filters and function
    /// arguments. Deeper input is rejected as a syntax error.
    pub max_nesting_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Evaluator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Maximum depth below the segment input a descendant segment visits
    pub max_depth: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonPathConfig {
    /// Compiler settings
    pub compiler: CompilerConfig,
    /// Evaluator settings
    pub evaluator: EvaluatorConfig,
}

impl JsonPathConfig {
    /// Load configuration from a JSON document; missing fields keep their
    /// defaults
    pub fn from_json_str(json: &str) -> Result<Self, JsonPathError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = JsonPathConfig::default();
        assert_eq!(config.compiler.max_nesting_depth, 128);
        assert_eq!(config.evaluator.max_depth, 1024);
    }

    #[test]
    fn test_partial_json() {
        let config = JsonPathConfig::from_json_str(r#"{"evaluator": {"max_depth": 8}}"#).unwrap();
        assert_eq!(config.evaluator.max_depth, 8);
        assert_eq!(config.compiler, CompilerConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            JsonPathConfig::from_json_str("{"),
            Err(JsonPathError::Configuration(_))
        ));
    }
}
