// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for pqbench.
//!
//! Explicit enum error types only. No `Box<dyn Error>` and no `anyhow`
//! inside the library crates - every failure has a named variant.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{AlgorithmName, Operation};

/// Top-level error type for configuration loading and algorithm setup.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Configuration Errors - Fail-Fast Before Any Measurement
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Algorithm Adapter Errors - Scoped To One Algorithm
    // =========================================================================
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Provider already registered: {name} ({implementation})")]
    ProviderAlreadyRegistered {
        name: AlgorithmName,
        implementation: String,
    },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors abort the run before anything is measured.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Duplicate algorithm name: {name}")]
    DuplicateAlgorithm { name: String },

    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },
}

/// Errors raised while binding to or driving a cryptographic provider.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Unknown algorithm: no provider binding registered for '{name}'")]
    UnknownAlgorithm { name: String },

    #[error("Failed to load provider '{implementation}' for {name}: {reason}")]
    ProviderLoadFailure {
        name: AlgorithmName,
        implementation: String,
        reason: String,
    },

    #[error("{algorithm} {operation} failed: {source}")]
    OperationFailure {
        algorithm: AlgorithmName,
        operation: Operation,
        #[source]
        source: ProviderError,
    },
}

impl AdapterError {
    /// Whether the error happened while resolving the provider, before any
    /// operation was attempted.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownAlgorithm { .. } | Self::ProviderLoadFailure { .. }
        )
    }
}

/// Failures reported by a provider for a single call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid {what}: {reason}")]
    InvalidInput { what: &'static str, reason: String },

    #[error("provider call failed: {reason}")]
    Failed { reason: String },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;
