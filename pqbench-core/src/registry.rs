// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Thread-safe provider registry using DashMap.
//!
//! Maps an algorithm name to one or more provider bindings, each tagged with
//! the implementation it comes from. Lookups happen once per configured
//! algorithm per run; the resulting handle is used for every call after that.

use std::sync::Arc;

use dashmap::DashMap;

use crate::adapter::{AlgorithmHandle, KemHandle, KemProvider, SignatureHandle, SignatureProvider};
use crate::config::AlgorithmSpec;
use crate::error::{AdapterError, BenchError, BenchResult};
use crate::pqclean;
use crate::types::{AlgorithmKind, AlgorithmName};

/// Builds a fresh KEM provider, or explains why it cannot.
pub type KemFactory = Arc<dyn Fn() -> Result<Box<dyn KemProvider>, String> + Send + Sync>;

/// Builds a fresh signature provider, or explains why it cannot.
pub type SignatureFactory =
    Arc<dyn Fn() -> Result<Box<dyn SignatureProvider>, String> + Send + Sync>;

/// Factory for one binding, tagged by algorithm kind.
#[derive(Clone)]
pub enum ProviderFactory {
    Kem(KemFactory),
    Signature(SignatureFactory),
}

impl ProviderFactory {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Self::Kem(_) => AlgorithmKind::Kem,
            Self::Signature(_) => AlgorithmKind::Signature,
        }
    }
}

/// A provider binding for one implementation of an algorithm.
#[derive(Clone)]
struct ProviderBinding {
    implementation: String,
    factory: ProviderFactory,
}

/// Public view of a registered binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAlgorithm {
    pub name: AlgorithmName,
    pub kind: AlgorithmKind,
    pub implementation: String,
}

/// Thread-safe registry of provider bindings.
pub struct ProviderRegistry {
    /// Map of algorithm name to its bindings, one per implementation tag.
    bindings: DashMap<AlgorithmName, Vec<ProviderBinding>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            bindings: DashMap::new(),
        }
    }

    /// Create a registry pre-populated with the built-in `pqcrypto` bindings.
    pub fn with_builtin() -> BenchResult<Self> {
        let registry = Self::new();
        pqclean::register_builtin(&registry)?;
        Ok(registry)
    }

    /// Create a registry with built-ins, wrapped in an Arc for sharing across threads.
    pub fn new_shared() -> BenchResult<Arc<Self>> {
        Ok(Arc::new(Self::with_builtin()?))
    }

    /// Register a KEM binding.
    /// Fails if the same name and implementation are already registered.
    pub fn register_kem<F>(
        &self,
        name: AlgorithmName,
        implementation: impl Into<String>,
        factory: F,
    ) -> BenchResult<()>
    where
        F: Fn() -> Result<Box<dyn KemProvider>, String> + Send + Sync + 'static,
    {
        self.insert(
            name,
            implementation.into(),
            ProviderFactory::Kem(Arc::new(factory)),
        )
    }

    /// Register a signature scheme binding.
    /// Fails if the same name and implementation are already registered.
    pub fn register_signature<F>(
        &self,
        name: AlgorithmName,
        implementation: impl Into<String>,
        factory: F,
    ) -> BenchResult<()>
    where
        F: Fn() -> Result<Box<dyn SignatureProvider>, String> + Send + Sync + 'static,
    {
        self.insert(
            name,
            implementation.into(),
            ProviderFactory::Signature(Arc::new(factory)),
        )
    }

    fn insert(
        &self,
        name: AlgorithmName,
        implementation: String,
        factory: ProviderFactory,
    ) -> BenchResult<()> {
        let mut entry = self.bindings.entry(name.clone()).or_default();

        // Check for duplicate - fail fast
        if entry.iter().any(|b| b.implementation == implementation) {
            return Err(BenchError::ProviderAlreadyRegistered {
                name,
                implementation,
            });
        }

        entry.push(ProviderBinding {
            implementation,
            factory,
        });
        Ok(())
    }

    /// Resolve a configured algorithm into a live handle.
    ///
    /// - `UnknownAlgorithm` when nothing is registered under the name.
    /// - `ProviderLoadFailure` when the name is known but the requested
    ///   implementation is missing, registered for the other algorithm
    ///   kind, or its factory fails.
    pub fn resolve(&self, spec: &AlgorithmSpec) -> Result<AlgorithmHandle, AdapterError> {
        let load_failure = |reason: String| AdapterError::ProviderLoadFailure {
            name: spec.name.clone(),
            implementation: spec.implementation.clone(),
            reason,
        };

        // Clone the factory out so the map shard is not held while it runs
        let factory = {
            let bindings = self.bindings.get(&spec.name).ok_or_else(|| {
                AdapterError::UnknownAlgorithm {
                    name: spec.name.to_string(),
                }
            })?;

            let binding = bindings
                .iter()
                .find(|b| b.implementation == spec.implementation)
                .ok_or_else(|| {
                    let available: Vec<&str> =
                        bindings.iter().map(|b| b.implementation.as_str()).collect();
                    load_failure(format!(
                        "implementation not available (registered: {})",
                        available.join(", ")
                    ))
                })?;

            binding.factory.clone()
        };

        if factory.kind() != spec.kind {
            return Err(load_failure(format!(
                "registered as {} but configured as {}",
                factory.kind(),
                spec.kind
            )));
        }

        let handle = match factory {
            ProviderFactory::Kem(make) => {
                let provider = make().map_err(load_failure)?;
                AlgorithmHandle::Kem(KemHandle::new(spec.name.clone(), provider))
            }
            ProviderFactory::Signature(make) => {
                let provider = make().map_err(load_failure)?;
                AlgorithmHandle::Signature(SignatureHandle::new(spec.name.clone(), provider))
            }
        };

        tracing::debug!(
            algorithm = %spec.name,
            implementation = %spec.implementation,
            kind = %spec.kind,
            "Provider resolved"
        );

        Ok(handle)
    }

    /// Check if any binding exists for a name.
    pub fn contains(&self, name: &AlgorithmName) -> bool {
        self.bindings.contains_key(name)
    }

    /// Get the number of registered algorithm names.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All bindings, sorted by kind, then name, then implementation.
    pub fn entries(&self) -> Vec<RegisteredAlgorithm> {
        let mut entries: Vec<RegisteredAlgorithm> = self
            .bindings
            .iter()
            .flat_map(|r| {
                let name = r.key().clone();
                r.value()
                    .iter()
                    .map(|b| RegisteredAlgorithm {
                        name: name.clone(),
                        kind: b.factory.kind(),
                        implementation: b.implementation.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        entries.sort_by(|a, b| {
            (a.kind.name(), &a.name, &a.implementation).cmp(&(
                b.kind.name(),
                &b.name,
                &b.implementation,
            ))
        });
        entries
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("algorithms", &self.bindings.len())
            .finish()
    }
}
