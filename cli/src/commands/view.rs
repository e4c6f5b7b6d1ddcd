// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration views
//!
//! Commands: agent, coordinator, defaults

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use scoutline_core::application::config_service::ConfigService;
use scoutline_core::domain::access::Role;
use scoutline_core::domain::view::ConfigView;

use super::load_service;

#[derive(Subcommand)]
pub enum ViewCommand {
    /// Agent scan defaults; credentials and filters need an admin role
    Agent,

    /// Coordinator settings (admin only)
    Coordinator,

    /// Public scan defaults
    Defaults,
}

pub async fn handle_command(
    command: ViewCommand,
    config_override: Option<PathBuf>,
    role: Role,
) -> Result<()> {
    let service = load_service(config_override).await?;
    let view = render(&service, command, role).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&view).context("Failed to serialize view")?
    );
    Ok(())
}

async fn render(service: &ConfigService, command: ViewCommand, role: Role) -> Result<ConfigView> {
    let view = match command {
        ViewCommand::Agent => service.load_agent_view(role).await?,
        ViewCommand::Coordinator => service.load_coordinator_view(role).await?,
        ViewCommand::Defaults => service.load_default_view().await?,
    };
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::write_settings;

    #[tokio::test]
    async fn test_coordinator_view_denied_for_guest() {
        let dir = tempfile::tempdir().unwrap();
        let service = load_service(Some(write_settings(dir.path()))).await.unwrap();

        assert!(render(&service, ViewCommand::Coordinator, Role::Guest)
            .await
            .is_err());
        let view = render(&service, ViewCommand::Coordinator, Role::Admin)
            .await
            .unwrap();
        assert_eq!(view.ip_slice_number, 64);
    }
}
