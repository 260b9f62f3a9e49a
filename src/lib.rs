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

//! JSONPath (RFC 9535) implementation in Rust
//!
//! Queries are compiled once into an immutable plan and evaluated against any
//! number of `serde_json` documents. Filter expressions are statically typed:
//! function extensions declare their parameter and return types, and every
//! call is checked before a plan is produced.
//!
//! ```
//! use octofhir_jsonpath::JsonPath;
//! use serde_json::json;
//!
//! let document = json!({"store": {"book": [
//!     {"title": "Sayings", "price": 8.95},
//!     {"title": "Moby Dick", "price": 22.99}
//! ]}});
//!
//! let path = JsonPath::parse("$.store.book[?@.price < 10].title").unwrap();
//! assert_eq!(path.query_values(&document), vec![&json!("Sayings")]);
//! ```
//!
//! For full control over the function extension repository and the
//! diagnostics listener, use [`Compiler`] and [`Evaluator`] directly.

pub mod ast;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod registry;
pub mod typing;

pub use compiler::{CompiledPath, Compiler, JsonPathCompiler};
pub use config::{CompilerConfig, EvaluatorConfig, JsonPathConfig};
pub use diagnostics::{Diagnostic, DiagnosticCollector, ErrorListener, LoggingErrorListener};
pub use error::{JsonPathError, JsonPathResult};
pub use evaluator::{Evaluator, Node, NodeList, NormalizedPath};
pub use registry::{
    FilterValue, FunctionExtension, FunctionExtensionRepository, default_repository,
    function_extension,
};
pub use typing::ExpressionType;

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A compiled query together with the evaluator that runs it
#[derive(Debug, Clone)]
pub struct JsonPath {
    path: CompiledPath,
    evaluator: Evaluator,
}

impl JsonPath {
    /// Compile `text` against the process-wide default repository
    pub fn parse(text: &str) -> JsonPathResult<Self> {
        Self::compile_with(&Compiler::default(), text)
    }

    /// Compile `text` with `compiler`, collecting its diagnostics into the
    /// returned error
    pub fn compile_with(compiler: &Compiler, text: &str) -> JsonPathResult<Self> {
        let collector = DiagnosticCollector::new();
        match compiler.compile_with_listener(text, &collector) {
            Some(path) => Ok(Self::from_compiled(path)),
            None => Err(JsonPathError::Compilation {
                source_text: text.to_string(),
                diagnostics: collector.take(),
            }),
        }
    }

    /// Wrap an already compiled path
    pub fn from_compiled(path: CompiledPath) -> Self {
        Self {
            path,
            evaluator: Evaluator::default(),
        }
    }

    /// Use a differently configured evaluator
    pub fn with_evaluator_config(mut self, config: EvaluatorConfig) -> Self {
        self.evaluator = Evaluator::new(config);
        self
    }

    /// The compiled plan
    pub fn compiled(&self) -> &CompiledPath {
        &self.path
    }

    /// Nodes of `document` matched by this query, with their locations
    pub fn query<'a>(&self, document: &'a Value) -> NodeList<'a> {
        self.evaluator.evaluate(&self.path, document)
    }

    /// Values of `document` matched by this query
    pub fn query_values<'a>(&self, document: &'a Value) -> Vec<&'a Value> {
        self.query(document).values()
    }
}

impl FromStr for JsonPath {
    type Err = JsonPathError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}
