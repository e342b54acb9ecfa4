// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! pqbench CLI
//!
//! Command-line interface for the pqbench post-quantum benchmark suite.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod logging;

/// pqbench - Post-quantum KEM and signature benchmark suite
#[derive(Parser)]
#[command(name = "pqbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full benchmark suite
    Run {
        /// Override the output directory from the configuration
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Override the number of timed trials per operation
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=10_000_000))]
        iterations: Option<u64>,

        /// Short smoke run: few trials and a brief stability phase
        #[arg(short, long)]
        quick: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: PathBuf,
    },

    /// List algorithms with a registered provider
    List,

    /// Print the summary of a saved result document
    Show {
        /// Path to a benchmark_results_*.json file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `run` configures logging from the config file itself
    if !matches!(cli.command, Commands::Run { .. }) {
        logging::init(cli.verbose, None)?;
    }

    match cli.command {
        Commands::Run {
            output_dir,
            iterations,
            quick,
        } => {
            let overrides = commands::run::Overrides {
                output_dir,
                iterations,
                quick,
            };
            commands::run::execute(&cli.config, cli.verbose, overrides).await
        }
        Commands::Validate { file } => commands::validate::execute(&file).await,
        Commands::List => commands::list::execute().await,
        Commands::Show { file } => commands::show::execute(&file).await,
    }
}
