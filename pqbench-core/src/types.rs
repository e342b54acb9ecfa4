// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! All types validate their invariants at creation time, so a value that
//! exists is a value that passed validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Largest payload or message size accepted: 16 MiB
const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Validated algorithm identifier, e.g. `ML-KEM-768` or `SPHINCS+-SHAKE-128s-simple`.
/// Must be non-empty, max 64 chars, alphanumeric plus `-`, `_`, `+` and `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlgorithmName(String);

impl AlgorithmName {
    /// Create a new AlgorithmName with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, HardValidationError> {
        let name = name.into();

        if name.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "name",
                value: name,
                reason: "Algorithm name cannot be empty".to_string(),
            });
        }

        if name.len() > 64 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "name",
                value: name.clone(),
                reason: format!("Algorithm name too long: {} chars (max 64)", name.len()),
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
        {
            return Err(HardValidationError::InvalidFieldValue {
                field: "name",
                value: name,
                reason: "Algorithm name must contain only ASCII alphanumerics, '-', '_', '+' and '.'"
                    .to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlgorithmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AlgorithmName {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AlgorithmName> for String {
    fn from(name: AlgorithmName) -> Self {
        name.0
    }
}

/// The two families of primitives the suite knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmKind {
    /// Key-encapsulation mechanism
    #[serde(rename = "kem")]
    Kem,
    /// Digital signature scheme
    #[serde(rename = "sign")]
    Signature,
}

impl AlgorithmKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Kem => "kem",
            Self::Signature => "sign",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single adapter operation, used for error context and result keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Keygen,
    Encapsulate,
    Decapsulate,
    Sign,
    Verify,
}

impl Operation {
    /// Short name used in result keys.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Keygen => "keygen",
            Self::Encapsulate => "encaps",
            Self::Decapsulate => "decaps",
            Self::Sign => "sign",
            Self::Verify => "verify",
        }
    }

    /// Key under which this operation's statistics are recorded.
    ///
    /// `keygen` is size independent; every other operation is keyed by the
    /// payload or message size it was measured with (`encaps_size_32`).
    pub fn record_key(&self, size: Option<MessageSize>) -> String {
        match size {
            Some(size) => format!("{}_size_{}", self.name(), size),
            None => self.name().to_string(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Validated payload/message size in bytes.
/// Must be between 1 byte and MAX_MESSAGE_SIZE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct MessageSize(usize);

impl MessageSize {
    /// Create a new MessageSize with bounds validation.
    pub fn new(bytes: usize) -> Result<Self, HardValidationError> {
        if bytes == 0 || bytes > MAX_MESSAGE_SIZE {
            return Err(HardValidationError::InvalidFieldValue {
                field: "size",
                value: bytes.to_string(),
                reason: format!("Size must be between 1 and {} bytes", MAX_MESSAGE_SIZE),
            });
        }
        Ok(Self(bytes))
    }

    /// Get the size in bytes.
    pub fn bytes(&self) -> usize {
        self.0
    }
}

impl fmt::Display for MessageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for MessageSize {
    type Error = HardValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageSize> for usize {
    fn from(size: MessageSize) -> Self {
        size.0
    }
}
