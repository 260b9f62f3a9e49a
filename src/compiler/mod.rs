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

//! Compiler for JSONPath queries
//!
//! Parses the query text, type-checks every filter expression against a
//! snapshot of the function extension repository and produces an immutable
//! [`CompiledPath`]. Problems are reported to an [`ErrorListener`]; a query
//! compiles only if nothing was reported.

mod analyzer;
pub mod plan;

pub use plan::{
    CompiledPath, FilterExpression, FilterExpressionKind, FilterQuery, Segment, Selector,
};

use crate::config::CompilerConfig;
use crate::diagnostics::{ErrorListener, LoggingErrorListener};
use crate::parser;
use crate::registry::{FunctionExtensionRepository, default_repository};
use analyzer::Analyzer;
use std::sync::Arc;

/// Turns query text into a [`CompiledPath`]
pub trait JsonPathCompiler: Send + Sync {
    /// Compile `source`, returning `None` if any diagnostic was reported
    fn compile(&self, source: &str) -> Option<CompiledPath>;
}

/// Compiler bound to a function extension repository and an error listener
#[derive(Clone)]
pub struct Compiler {
    repository: Arc<FunctionExtensionRepository>,
    listener: Arc<dyn ErrorListener>,
    config: CompilerConfig,
}

impl Compiler {
    /// Create a compiler with default configuration
    pub fn new(
        repository: Arc<FunctionExtensionRepository>,
        listener: Arc<dyn ErrorListener>,
    ) -> Self {
        Self::with_config(repository, listener, CompilerConfig::default())
    }

    /// Create a compiler with custom configuration
    pub fn with_config(
        repository: Arc<FunctionExtensionRepository>,
        listener: Arc<dyn ErrorListener>,
        config: CompilerConfig,
    ) -> Self {
        Self {
            repository,
            listener,
            config,
        }
    }

    /// Repository function names are resolved against
    pub fn repository(&self) -> &Arc<FunctionExtensionRepository> {
        &self.repository
    }

    /// Active configuration
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `source`, reporting to `listener` instead of the compiler's
    /// own listener
    pub fn compile_with_listener(
        &self,
        source: &str,
        listener: &dyn ErrorListener,
    ) -> Option<CompiledPath> {
        let query = match parser::parse(source, &self.config) {
            Ok(query) => query,
            Err(error) => {
                log::debug!("JSONPath {source:?} rejected by the parser: {error}");
                listener.syntax_error(
                    error.line,
                    error.column,
                    &error.message,
                    error.offending_symbol.as_deref(),
                );
                return None;
            }
        };

        // One snapshot per call keeps the outcome independent of concurrent
        // registrations
        let snapshot = self.repository.snapshot();
        let mut analyzer = Analyzer::new(source, &snapshot, listener);
        let segments = analyzer.compile_segments(&query);

        match segments {
            Some(segments) if analyzer.reported() == 0 => {
                log::debug!(
                    "compiled JSONPath {source:?} into {} segments",
                    segments.len()
                );
                Some(CompiledPath::new(source, segments))
            }
            _ => {
                log::debug!(
                    "JSONPath {source:?} failed to compile with {} diagnostics",
                    analyzer.reported()
                );
                None
            }
        }
    }
}

impl Default for Compiler {
    /// Compiler over the process-wide default repository that logs its
    /// diagnostics
    fn default() -> Self {
        Self::new(default_repository(), Arc::new(LoggingErrorListener))
    }
}

impl JsonPathCompiler for Compiler {
    fn compile(&self, source: &str) -> Option<CompiledPath> {
        self.compile_with_listener(source, self.listener.as_ref())
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("repository", &self.repository)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostic, DiagnosticCollector};

    fn compiler() -> (Compiler, Arc<DiagnosticCollector>) {
        let collector = Arc::new(DiagnosticCollector::new());
        let compiler = Compiler::new(
            Arc::new(FunctionExtensionRepository::with_builtins()),
            collector.clone(),
        );
        (compiler, collector)
    }

    #[test]
    fn test_compile_keeps_source() {
        let (compiler, collector) = compiler();
        let path = compiler.compile("$.store.book[?@.price < 10]").unwrap();
        assert_eq!(path.to_string(), "$.store.book[?@.price < 10]");
        assert_eq!(path.segments().len(), 3);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_syntax_error_is_forwarded() {
        let (compiler, collector) = compiler();
        assert!(compiler.compile("$.a[?@.b ==]").is_none());
        assert_eq!(
            collector.take(),
            vec![Diagnostic::SyntaxError {
                line: 1,
                column: 11,
                message: "expected literal, query or function call, found ']'".to_string(),
                offending_symbol: Some("]".to_string()),
            }]
        );
    }

    #[test]
    fn test_semantic_error_fails_compilation() {
        let (compiler, collector) = compiler();
        assert!(compiler.compile("$[?length(@.a)]").is_none());
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_listener_override() {
        let (compiler, own) = compiler();
        let other = DiagnosticCollector::new();
        assert!(compiler.compile_with_listener("$[?nope()]", &other).is_none());
        assert!(own.is_empty());
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_configured_compiler_reports_to_its_listener() {
        let collector = Arc::new(DiagnosticCollector::new());
        let compiler = Compiler::with_config(
            default_repository(),
            collector.clone(),
            CompilerConfig {
                max_nesting_depth: 2,
            },
        );

        assert!(compiler.compile("$[?@.a]").is_some());
        assert!(compiler.compile("$[?((((@.a))))]").is_none());
        assert!(compiler.compile("$[?nope(@.a)]").is_none());

        let diagnostics = collector.take();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].is_syntax_error());
        assert_eq!(
            diagnostics[1],
            Diagnostic::UnknownFunctionExtension {
                name: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_compiled_path_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledPath>();
        assert_send_sync::<Compiler>();
    }
}
