// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

/// Runtime toggles for the built-in chat room.
///
/// Held in memory only; a coordinator restart returns to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub anonymous: bool,
    pub not_del_file_dir: bool,
    pub load_history: bool,
    pub max_history_message: u32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            anonymous: false,
            not_del_file_dir: false,
            load_history: true,
            max_history_message: 1000,
        }
    }
}
