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
//! Function extension registry for JSONPath filter expressions
//!
//! This module defines the contract every pluggable function satisfies, the
//! repository that maps names to implementations, and the built-in functions
//! defined by RFC 9535.

pub mod function;
pub mod functions;
pub mod repository;

pub use function::{FilterValue, FnExtension, FunctionExtension, function_extension};
pub use functions::builtins;
pub use repository::{FunctionExtensionRepository, RepositorySnapshot, default_repository};
