// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Developer CLI for motion graphs.
//!
//! `motion-cli rebuild` deep-clones a graph file through the rebuild engine
//! and writes the clone; `inspect` and `hash` read a graph without changing
//! it; `config` shows or edits the saved preferences that `rebuild` starts
//! from. Command-line flags always win over saved preferences.
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod io;
pub mod render;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

/// Parses the command line, installs logging and runs the chosen command.
pub fn entrypoint() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(cli.log_level().parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config_dir = cli.config_dir.as_deref();
    match cli.command {
        Commands::Rebuild(args) => commands::rebuild(&args, config_dir),
        Commands::Inspect { input, tree } => commands::inspect(&input, tree),
        Commands::Hash { input } => commands::hash(&input),
        Commands::Config(args) => commands::config(&args, config_dir),
    }
}
