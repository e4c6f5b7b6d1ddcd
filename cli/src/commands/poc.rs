// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! POC template commands

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use scoutline_core::domain::access::Role;
use scoutline_core::domain::agent_config::PocKind;

use super::load_service;

#[derive(Subcommand)]
pub enum PocCommand {
    /// Copy a .yml/.yaml template into the configured POC directory
    Upload {
        /// Template family: xray or nuclei
        #[arg(long)]
        kind: PocKind,

        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

pub async fn handle_command(
    command: PocCommand,
    config_override: Option<PathBuf>,
    role: Role,
) -> Result<()> {
    match command {
        PocCommand::Upload { kind, file } => {
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow!("Invalid POC file path: {:?}", file))?
                .to_string();
            let contents =
                std::fs::read(&file).with_context(|| format!("Failed to read {:?}", file))?;

            let service = load_service(config_override).await?;
            let saved = service
                .upload_poc(role, kind, &file_name, &contents)
                .await
                .context("Failed to upload POC")?;
            println!(
                "{}",
                format!("✓ {} POC saved: {}", kind, saved.display()).green()
            );
            Ok(())
        }
    }
}
