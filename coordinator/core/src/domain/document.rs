// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Configuration Documents
//!
//! A configuration *domain* is one of the two mutable documents the
//! coordinator manages on behalf of the cluster:
//!
//! | Domain | Document | Consumed by |
//! |--------|----------|-------------|
//! | [`ConfigDomain::Coordinator`] | [`super::coordinator_config::CoordinatorConfig`] | task dispatcher, notifier, wiki export |
//! | [`ConfigDomain::Agent`] | [`super::agent_config::AgentConfig`] | scan agents (port scan, fingerprint, online API, domain scan) |
//!
//! Both documents round-trip as a whole; there is no partial-field update at
//! the storage layer.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ConfigError;

/// The configuration scopes managed by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigDomain {
    Coordinator,
    Agent,
}

impl fmt::Display for ConfigDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigDomain::Coordinator => write!(f, "coordinator"),
            ConfigDomain::Agent => write!(f, "agent"),
        }
    }
}

/// A document with a fixed, known shape that a [`crate::infrastructure::config_store::ConfigStore`]
/// can own.
///
/// `Default` must produce the baseline document: deserializing an empty
/// file yields exactly `Self::default()`.
pub trait ConfigDocument:
    Serialize + DeserializeOwned + Clone + Default + fmt::Debug + Send + Sync + 'static
{
    const DOMAIN: ConfigDomain;

    /// Structural checks run before a document is persisted.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Parse a document from its YAML storage form.
    ///
    /// A blank file is the baseline document.
    fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
