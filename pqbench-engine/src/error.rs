// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Engine-level error type.

use std::any::Any;

use thiserror::Error;

use pqbench_core::AdapterError;

use crate::reporter::ReporterError;
use crate::stats::StatsError;

/// Failures that end a benchmark phase early.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    #[error("Report error: {0}")]
    Reporter(#[from] ReporterError),

    #[error("Run interrupted")]
    Interrupted,

    #[error("Benchmark phase panicked: {message}")]
    Panicked { message: String },
}

impl EngineError {
    /// Build a `Panicked` error from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        Self::Panicked {
            message: panic_message(payload.as_ref()),
        }
    }
}

/// Text carried by a `catch_unwind` payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
