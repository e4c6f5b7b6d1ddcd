// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Scoutline Configuration CLI
//!
//! The `scoutline` binary inspects and edits the coordinator's runtime
//! configuration directly on disk, with the same role checks the console
//! applies.
//!
//! ## Commands
//!
//! - `scoutline config show|validate|generate` - Settings file management
//! - `scoutline view agent|coordinator|defaults` - Print a configuration view
//! - `scoutline resource get|put|list` - Named resource files
//! - `scoutline set proxy|slices|portscan|filter|notify` - Edit document sections
//! - `scoutline poc upload` - Install a POC template
//! - `scoutline probe` - Check the configured API credentials

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use scoutline_cli::commands::{
    self, ConfigCommand, PocCommand, ResourceCommand, SetCommand, ViewCommand,
};
use scoutline_core::domain::access::Role;

/// Scoutline - runtime configuration for the scan coordinator
#[derive(Parser)]
#[command(name = "scoutline")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to settings file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "SCOUTLINE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Role the command runs as (superadmin, admin, guest, anonymous)
    #[arg(long, global = true, env = "SCOUTLINE_ROLE", default_value = "anonymous")]
    role: Role,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SCOUTLINE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Settings file management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Print a configuration view as JSON
    #[command(name = "view")]
    View {
        #[command(subcommand)]
        command: ViewCommand,
    },

    /// Read or replace named resource files
    #[command(name = "resource")]
    Resource {
        #[command(subcommand)]
        command: ResourceCommand,
    },

    /// Edit a section of the coordinator or agent document
    #[command(name = "set")]
    Set {
        #[command(subcommand)]
        command: SetCommand,
    },

    /// POC template management
    #[command(name = "poc")]
    Poc {
        #[command(subcommand)]
        command: PocCommand,
    },

    /// Check every configured API credential against its provider
    #[command(name = "probe")]
    Probe,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::View { command }) => {
            commands::view::handle_command(command, cli.config, cli.role).await
        }
        Some(Commands::Resource { command }) => {
            commands::resource::handle_command(command, cli.config, cli.role).await
        }
        Some(Commands::Set { command }) => {
            commands::set::handle_command(command, cli.config, cli.role).await
        }
        Some(Commands::Poc { command }) => {
            commands::poc::handle_command(command, cli.config, cli.role).await
        }
        Some(Commands::Probe) => commands::probe::run(cli.config, cli.role).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
