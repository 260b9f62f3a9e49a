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
//! Named registry of function extensions
//!
//! The repository is read far more often than it is written: every compile
//! call looks names up, while registrations happen when the embedding
//! application configures itself. Writers therefore copy the map and publish
//! the new version atomically, and readers take a snapshot that never
//! changes underneath them.

use super::function::FunctionExtension;
use super::functions::builtins;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

type ExtensionMap = FxHashMap<String, Arc<dyn FunctionExtension>>;

static DEFAULT_REPOSITORY: Lazy<Arc<FunctionExtensionRepository>> =
    Lazy::new(|| Arc::new(FunctionExtensionRepository::with_builtins()));

/// Process-wide repository, seeded with the built-in functions on first use
///
/// Applications that prefer explicit wiring can construct their own
/// [`FunctionExtensionRepository`] and hand it to the compiler instead.
pub fn default_repository() -> Arc<FunctionExtensionRepository> {
    Arc::clone(&DEFAULT_REPOSITORY)
}

/// Mutable mapping from function name to implementation
///
/// Names are case-sensitive and unique. Lookups never block each other and
/// never observe a half-applied registration.
pub struct FunctionExtensionRepository {
    extensions: RwLock<Arc<ExtensionMap>>,
}

impl FunctionExtensionRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            extensions: RwLock::new(Arc::new(ExtensionMap::default())),
        }
    }

    /// Create a repository holding length, count, match, search and value
    pub fn with_builtins() -> Self {
        let extensions: ExtensionMap = builtins()
            .into_iter()
            .map(|(name, extension)| (name.to_string(), extension))
            .collect();
        Self {
            extensions: RwLock::new(Arc::new(extensions)),
        }
    }

    /// Register `extension` under `name`, returning the entry it replaced
    pub fn register(
        &self,
        name: impl Into<String>,
        extension: Arc<dyn FunctionExtension>,
    ) -> Option<Arc<dyn FunctionExtension>> {
        let name = name.into();
        log::debug!(
            "Registering JSONPath function extension \"{name}\" ({:?}) -> {}",
            extension.argument_types(),
            extension.return_type()
        );
        let mut guard = self.extensions.write();
        Arc::make_mut(&mut *guard).insert(name, extension)
    }

    /// Remove the entry registered under `name`
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn FunctionExtension>> {
        let mut guard = self.extensions.write();
        if !guard.contains_key(name) {
            return None;
        }
        log::debug!("Unregistering JSONPath function extension \"{name}\"");
        Arc::make_mut(&mut *guard).remove(name)
    }

    /// Current registration under `name`
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn FunctionExtension>> {
        self.extensions.read().get(name).cloned()
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.extensions.read().contains_key(name)
    }

    /// Registered names in lexical order
    pub fn names(&self) -> Vec<String> {
        self.snapshot().names()
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.extensions.read().len()
    }

    /// Whether no function is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An immutable view of the current registrations
    pub fn snapshot(&self) -> RepositorySnapshot {
        RepositorySnapshot {
            extensions: Arc::clone(&*self.extensions.read()),
        }
    }
}

impl Default for FunctionExtensionRepository {
    /// Creates a new repository populated with all built-in functions.
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for FunctionExtensionRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionExtensionRepository")
            .field("names", &self.names())
            .finish()
    }
}

/// Registrations as they were when the snapshot was taken
#[derive(Clone)]
pub struct RepositorySnapshot {
    extensions: Arc<ExtensionMap>,
}

impl RepositorySnapshot {
    /// Registration under `name` at snapshot time
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn FunctionExtension>> {
        self.extensions.get(name).cloned()
    }

    /// Registered names in lexical order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.extensions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for RepositorySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositorySnapshot")
            .field("names", &self.names())
            .finish()
    }
}
