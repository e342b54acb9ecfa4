// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Tracing subscriber setup.
//!
//! Level precedence: `--verbose`, then `RUST_LOG`, then `logging.level`
//! from the configuration, then `info`.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Context;
use pqbench_core::LoggingConfig;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init(verbose: bool, logging: Option<&LoggingConfig>) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(logging.map(|l| l.level.as_str()).unwrap_or("info"))
        })
    };

    let file_layer = match logging.and_then(|l| l.file.as_ref()) {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}
