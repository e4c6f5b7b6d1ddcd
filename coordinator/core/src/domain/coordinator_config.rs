// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

// Coordinator Configuration Document
//
// Settings only the coordinator itself reads:
// - Task slicing (how many IPs / ports per dispatched sub-task)
// - Notification channel tokens
// - Wiki export credentials

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::document::{ConfigDocument, ConfigDomain};
use super::error::ConfigError;

pub const NOTIFY_SERVERCHAN: &str = "serverchan";
pub const NOTIFY_DINGTALK: &str = "dingtalk";
pub const NOTIFY_FEISHU: &str = "feishu";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub task: TaskConfig,
    /// Channel name -> token. Keyed by [`NOTIFY_SERVERCHAN`], [`NOTIFY_DINGTALK`], [`NOTIFY_FEISHU`].
    pub notify: BTreeMap<String, NotifyToken>,
    pub wiki: WikiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub ip_slice_number: u32,
    pub port_slice_number: u32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            ip_slice_number: 64,
            port_slice_number: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyToken {
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    pub feishu: FeishuWikiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeishuWikiConfig {
    pub app_id: String,
    pub app_secret: String,
    pub user_access_refresh_token: String,
}

impl CoordinatorConfig {
    /// Token for a notification channel, empty when the channel is unset.
    pub fn notify_token(&self, channel: &str) -> &str {
        self.notify
            .get(channel)
            .map(|n| n.token.as_str())
            .unwrap_or("")
    }

    pub fn set_notify_token(&mut self, channel: &str, token: impl Into<String>) {
        self.notify.insert(
            channel.to_string(),
            NotifyToken {
                token: token.into(),
            },
        );
    }
}

impl ConfigDocument for CoordinatorConfig {
    const DOMAIN: ConfigDomain = ConfigDomain::Coordinator;

    fn validate(&self) -> Result<(), ConfigError> {
        if self.task.ip_slice_number == 0 || self.task.port_slice_number == 0 {
            return Err(ConfigError::InvalidInput(
                "task slice numbers must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
