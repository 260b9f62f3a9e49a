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
//! Error type of the convenience API

use crate::diagnostics::Diagnostic;
use thiserror::Error;

/// Errors returned by [`JsonPath`](crate::JsonPath) and configuration loading
#[derive(Error, Debug)]
pub enum JsonPathError {
    /// The query did not compile
    #[error("Failed to compile JSONPath \"{source_text}\": {}", summarize(.diagnostics))]
    Compilation {
        /// Query text as given
        source_text: String,
        /// Every diagnostic reported for the query
        diagnostics: Vec<Diagnostic>,
    },

    /// A configuration document could not be read
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] serde_json::Error),
}

impl JsonPathError {
    /// Diagnostics behind a compilation failure, empty for other errors
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            JsonPathError::Compilation { diagnostics, .. } => diagnostics,
            JsonPathError::Configuration(_) => &[],
        }
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for the convenience API
pub type JsonPathResult<T> = Result<T, JsonPathError>;
