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

//! JSONPath evaluator
//!
//! Applies a [`CompiledPath`] to a document. Evaluation never fails: missing
//! members, out of range indices and values that do not reduce are simply
//! non-matches. The evaluator keeps no state between calls, so one instance
//! may be shared freely across threads.

mod comparison;
mod filter;
pub mod node;
mod selectors;

pub use node::{Location, Node, NodeList, NormalizedPath, PathElement};

use crate::compiler::CompiledPath;
use crate::config::EvaluatorConfig;
use serde_json::Value;

/// Evaluates compiled paths against documents
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    /// Create an evaluator
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Select the nodes of `root` matched by `path`, in document order
    pub fn evaluate<'a>(&self, path: &CompiledPath, root: &'a Value) -> NodeList<'a> {
        let start = vec![(NormalizedPath::root(), root)];
        let nodes: Vec<Node<'a>> = self
            .select(path.segments(), root, start)
            .into_iter()
            .map(|(path, value)| Node { path, value })
            .collect();
        log::trace!("{path} matched {} nodes", nodes.len());
        NodeList::from(nodes)
    }
}
