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
//! Diagnostic system for JSONPath compilation
//!
//! The compiler never fails by panicking or by returning rich errors from
//! deep inside the analysis. It reports every finding to an [`ErrorListener`]
//! and keeps going, so one compile call surfaces all problems at once.

pub mod diagnostic;
pub mod listener;

pub use diagnostic::{CoercedArgument, Diagnostic};
pub use listener::{DiagnosticCollector, ErrorListener, FanOutErrorListener, LoggingErrorListener};
