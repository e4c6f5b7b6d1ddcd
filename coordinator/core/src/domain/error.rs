// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

use std::path::PathBuf;
use thiserror::Error;

use super::access::Role;

/// Errors surfaced by the configuration store, access gate and resource
/// registry.
///
/// None of these are retried and none of them leave partially applied state
/// behind: a failed reload keeps the previous snapshot, a failed write keeps
/// the previous file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("role {role} is not permitted to perform this operation")]
    Unauthorized { role: Role },

    #[error("unknown resource type: {0}")]
    UnknownResource(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for both an unknown resource token and a known token whose file
    /// does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            ConfigError::UnknownResource(_) => true,
            ConfigError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
