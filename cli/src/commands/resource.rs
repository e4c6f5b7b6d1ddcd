// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Named resource commands
//!
//! Commands: get, put, list

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;

use scoutline_core::domain::access::Role;
use scoutline_core::domain::named_resource::NamedResource;

use super::load_service;

#[derive(Subcommand)]
pub enum ResourceCommand {
    /// Print a resource file to stdout
    Get {
        /// Resource token (see `scoutline resource list`)
        token: String,
    },

    /// Replace a resource file with the contents of FILE
    Put {
        token: String,

        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List known resource tokens
    List,
}

pub async fn handle_command(
    command: ResourceCommand,
    config_override: Option<PathBuf>,
    role: Role,
) -> Result<()> {
    match command {
        ResourceCommand::Get { token } => {
            let service = load_service(config_override).await?;
            let contents = service
                .load_resource(&token)
                .await
                .with_context(|| format!("Failed to read resource '{}'", token))?;
            std::io::stdout()
                .write_all(&contents)
                .context("Failed to write resource to stdout")?;
            Ok(())
        }
        ResourceCommand::Put { token, file } => {
            let contents =
                std::fs::read(&file).with_context(|| format!("Failed to read {:?}", file))?;
            let service = load_service(config_override).await?;
            let path = if token == NamedResource::TaskWorkspace.token() {
                service.save_task_workspace(role, &contents).await
            } else {
                service.save_resource(role, &token, &contents).await
            }
            .with_context(|| format!("Failed to save resource '{}'", token))?;
            println!(
                "{}",
                format!("✓ Resource '{}' saved: {}", token, path.display()).green()
            );
            Ok(())
        }
        ResourceCommand::List => {
            println!("{}", "Named resources:".bold());
            for resource in NamedResource::ALL {
                println!("  {:<24} {}", resource.token(), resource.relative_path().dimmed());
            }
            Ok(())
        }
    }
}
