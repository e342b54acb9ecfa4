// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! pqbench Core Library
//!
//! Shared building blocks for the pqbench post-quantum benchmark suite.
//! Provides strict configuration parsing, validated identifiers, the
//! algorithm capability interface and the provider registry that binds
//! algorithm names to concrete cryptographic implementations.

pub mod adapter;
pub mod config;
pub mod error;
pub mod pqclean;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use adapter::{
    AlgorithmHandle, Encapsulation, KemHandle, KemProvider, KeyPair, SignatureHandle,
    SignatureProvider,
};
pub use config::{
    AlgorithmSpec, Config, ConfigLoader, ExecutionConfig, LoggingConfig, MonitoringConfig,
};
pub use error::{AdapterError, BenchError, BenchResult, HardValidationError, ProviderError};
pub use registry::ProviderRegistry;
pub use types::{AlgorithmKind, AlgorithmName, MessageSize, Operation};
