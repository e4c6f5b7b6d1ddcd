// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Document section edits
//!
//! Commands: proxy, slices, portscan, filter, notify

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use scoutline_core::application::config_service::{ConfigService, PortscanUpdate};
use scoutline_core::domain::access::Role;

use super::load_service;

#[derive(Subcommand)]
pub enum SetCommand {
    /// Replace the agent proxy pool with the lines of FILE
    Proxy {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Task slicing used when the coordinator splits a scan
    Slices {
        /// IPs per sub-task
        #[arg(long)]
        ip: u32,

        /// Ports per sub-task
        #[arg(long)]
        port: u32,
    },

    /// Agent port scan defaults
    Portscan {
        /// Engine: masscan, nmap or gogo (anything else falls back to masscan)
        #[arg(long, default_value = "masscan")]
        cmdbin: String,

        #[arg(long, default_value = "--top-ports 1000")]
        port: String,

        #[arg(long, default_value_t = 1000)]
        rate: u32,

        #[arg(long, default_value = "-sS")]
        tech: String,

        /// Ping hosts before scanning
        #[arg(long)]
        ping: bool,
    },

    /// Agent result filters
    Filter {
        #[arg(long, default_value_t = 50)]
        max_port_per_ip: u32,

        #[arg(long, default_value_t = 100)]
        max_domain_per_ip: u32,

        /// Newline separated page titles to drop
        #[arg(long, default_value = "")]
        title: String,
    },

    /// Notification channel tokens
    Notify {
        #[arg(long, default_value = "")]
        serverchan: String,

        #[arg(long, default_value = "")]
        dingtalk: String,

        #[arg(long, default_value = "")]
        feishu: String,

        /// Send a test message after saving
        #[arg(long)]
        test: bool,
    },
}

pub async fn handle_command(
    command: SetCommand,
    config_override: Option<PathBuf>,
    role: Role,
) -> Result<()> {
    let service = load_service(config_override).await?;
    let section = apply(&service, command, role).await?;
    println!("{}", format!("✓ {} saved", section).green());
    Ok(())
}

async fn apply(service: &ConfigService, command: SetCommand, role: Role) -> Result<&'static str> {
    match command {
        SetCommand::Proxy { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            service.save_proxy(role, &text).await?;
            Ok("Proxy list")
        }
        SetCommand::Slices { ip, port } => {
            service.save_task_slices(role, ip, port).await?;
            Ok("Task slices")
        }
        SetCommand::Portscan {
            cmdbin,
            port,
            rate,
            tech,
            ping,
        } => {
            service
                .save_portscan(
                    role,
                    PortscanUpdate {
                        cmdbin,
                        port,
                        rate,
                        tech,
                        ping,
                    },
                )
                .await?;
            Ok("Port scan defaults")
        }
        SetCommand::Filter {
            max_port_per_ip,
            max_domain_per_ip,
            title,
        } => {
            service
                .save_filter(role, max_port_per_ip, max_domain_per_ip, &title)
                .await?;
            Ok("Filters")
        }
        SetCommand::Notify {
            serverchan,
            dingtalk,
            feishu,
            test,
        } => {
            service
                .save_task_notify(role, &serverchan, &dingtalk, &feishu)
                .await?;
            if test {
                service.test_notify(role).await?;
            }
            Ok("Notification tokens")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::write_settings;

    #[tokio::test]
    async fn test_set_slices_requires_admin() {
        let dir = tempfile::tempdir().unwrap();
        let service = load_service(Some(write_settings(dir.path()))).await.unwrap();

        let denied = apply(&service, SetCommand::Slices { ip: 8, port: 100 }, Role::Guest).await;
        assert!(denied.is_err());
        assert!(!dir.path().join("conf/server.yml").exists());

        apply(&service, SetCommand::Slices { ip: 8, port: 100 }, Role::Admin)
            .await
            .unwrap();
        let written = std::fs::read_to_string(dir.path().join("conf/server.yml")).unwrap();
        assert!(written.contains("ip_slice_number: 8"));
    }

    #[tokio::test]
    async fn test_set_proxy_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = load_service(Some(write_settings(dir.path()))).await.unwrap();
        let proxies = dir.path().join("proxies.txt");
        std::fs::write(&proxies, "socks5://127.0.0.1:1080\n\n").unwrap();

        apply(&service, SetCommand::Proxy { file: proxies }, Role::SuperAdmin)
            .await
            .unwrap();
        assert_eq!(
            service.agent_store().current().proxy.host,
            vec!["socks5://127.0.0.1:1080"]
        );
    }
}
