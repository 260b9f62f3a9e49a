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
//! Error listener contract and the stock listeners

use super::diagnostic::{CoercedArgument, Diagnostic};
use crate::typing::ExpressionType;
use parking_lot::Mutex;
use std::sync::Arc;

/// Observer for compile-time diagnostics
///
/// The compiler calls exactly one operation per finding, synchronously, and
/// never consults the listener for a decision. Each operation has a default
/// implementation that packs its arguments into a [`Diagnostic`] and hands it
/// to [`diagnostic`](Self::diagnostic), so a listener may override either the
/// individual operations or that single sink.
pub trait ErrorListener: Send + Sync {
    /// Sink used by the default implementations of the other operations
    fn diagnostic(&self, _diagnostic: Diagnostic) {}

    /// A function call names no registered function extension
    fn unknown_function_extension(&self, name: &str) {
        self.diagnostic(Diagnostic::UnknownFunctionExtension {
            name: name.to_string(),
        });
    }

    /// A value-returning function stands where a test is required
    fn invalid_function_extension_for_test_expression(&self, name: &str) {
        self.diagnostic(Diagnostic::InvalidFunctionExtensionForTestExpression {
            name: name.to_string(),
        });
    }

    /// A logical-returning function stands where a comparable is required
    fn invalid_function_extension_for_comparable(&self, name: &str) {
        self.diagnostic(Diagnostic::InvalidFunctionExtensionForComparable {
            name: name.to_string(),
        });
    }

    /// The actual arguments of a call do not fit the declared signature
    fn invalid_arglist_for_function_extension(
        &self,
        name: &str,
        expected: &[ExpressionType],
        actual: &[CoercedArgument],
    ) {
        self.diagnostic(Diagnostic::InvalidArglistForFunctionExtension {
            name: name.to_string(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }

    /// A test expression has no usable form
    fn invalid_test_expression(&self, text: &str) {
        self.diagnostic(Diagnostic::InvalidTestExpression {
            text: text.to_string(),
        });
    }

    /// The grammar rejected the source text
    fn syntax_error(
        &self,
        line: usize,
        column: usize,
        message: &str,
        offending_symbol: Option<&str>,
    ) {
        self.diagnostic(Diagnostic::SyntaxError {
            line,
            column,
            message: message.to_string(),
            offending_symbol: offending_symbol.map(str::to_string),
        });
    }
}

/// Listener that keeps every diagnostic it receives
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the diagnostics collected so far, in report order
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Take the collected diagnostics, leaving the collector empty
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    /// Number of diagnostics collected
    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorListener for DiagnosticCollector {
    fn diagnostic(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

/// Listener that writes every diagnostic to the `log` facade at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorListener;

impl ErrorListener for LoggingErrorListener {
    fn diagnostic(&self, diagnostic: Diagnostic) {
        log::error!("{diagnostic}");
    }
}

/// Listener that forwards every operation to several listeners, in order
#[derive(Default, Clone)]
pub struct FanOutErrorListener {
    listeners: Vec<Arc<dyn ErrorListener>>,
}

impl FanOutErrorListener {
    /// Create a fan-out over `listeners`
    pub fn new(listeners: Vec<Arc<dyn ErrorListener>>) -> Self {
        Self { listeners }
    }

    /// Add a listener
    pub fn with(mut self, listener: Arc<dyn ErrorListener>) -> Self {
        self.listeners.push(listener);
        self
    }
}

impl ErrorListener for FanOutErrorListener {
    fn diagnostic(&self, diagnostic: Diagnostic) {
        for listener in &self.listeners {
            diagnostic.dispatch(listener.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct UnknownNameCounter(AtomicUsize);

    impl ErrorListener for UnknownNameCounter {
        fn unknown_function_extension(&self, _name: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_collector_records_in_order() {
        let collector = DiagnosticCollector::new();
        collector.unknown_function_extension("nope");
        collector.invalid_test_expression("1");

        assert_eq!(
            collector.diagnostics(),
            vec![
                Diagnostic::UnknownFunctionExtension {
                    name: "nope".to_string()
                },
                Diagnostic::InvalidTestExpression {
                    text: "1".to_string()
                },
            ]
        );
        assert_eq!(collector.take().len(), 2);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_fan_out_reaches_overridden_operations() {
        let counter = Arc::new(UnknownNameCounter::default());
        let collector = Arc::new(DiagnosticCollector::new());
        let fan_out = FanOutErrorListener::new(vec![counter.clone() as Arc<dyn ErrorListener>])
            .with(collector.clone());

        fan_out.unknown_function_extension("nope");
        fan_out.syntax_error(1, 2, "unexpected token", Some("]"));

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(collector.len(), 2);
    }
}
