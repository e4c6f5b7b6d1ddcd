// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::ConfigDomain;

/// Section of a configuration document touched by a save operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSection {
    TaskSlices,
    WikiFeishu,
    TaskNotify,
    ApiTokens,
    Fingerprint,
    Proxy,
    Domainscan,
    Portscan,
    Filter,
}

/// Reload signals for subsystems that cache configuration.
///
/// Published after the change is durable; subscribers re-read the document
/// or resource instead of trusting a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfigEvent {
    DocumentChanged {
        domain: ConfigDomain,
        section: ConfigSection,
        changed_at: DateTime<Utc>,
    },
    ResourceSaved {
        token: String,
        saved_at: DateTime<Utc>,
    },
    /// The task workspace map must be re-read by the dispatcher
    TaskWorkspaceChanged {
        changed_at: DateTime<Utc>,
    },
    PocUploaded {
        kind: String,
        file_name: String,
        uploaded_at: DateTime<Utc>,
    },
    ChatSettingsChanged {
        changed_at: DateTime<Utc>,
    },
    NotificationRequested {
        message: String,
        requested_at: DateTime<Utc>,
    },
}

impl ConfigEvent {
    pub fn document_changed(domain: ConfigDomain, section: ConfigSection) -> Self {
        ConfigEvent::DocumentChanged {
            domain,
            section,
            changed_at: Utc::now(),
        }
    }
}
