// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Access Gate
//!
//! Every mutating configuration operation calls [`AccessGate::require`] as its
//! first statement. Reads that have a public fallback call
//! [`AccessGate::authorize`] and degrade instead of failing.
//!
//! The caller's [`Role`] comes from the session layer in front of the
//! coordinator; this module only evaluates it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ConfigError;

/// Capability level of the caller, as resolved by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    SuperAdmin,
    Admin,
    Guest,
    Anonymous,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::SuperAdmin => "superadmin",
            Role::Admin => "admin",
            Role::Guest => "guest",
            Role::Anonymous => "anonymous",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "superadmin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "guest" => Ok(Role::Guest),
            "anonymous" | "" => Ok(Role::Anonymous),
            other => Err(ConfigError::InvalidInput(format!("unknown role '{}'", other))),
        }
    }
}

/// Roles allowed to read privileged configuration and to mutate anything.
pub const ADMIN_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin];

/// Stateless role evaluator.
pub struct AccessGate;

impl AccessGate {
    /// True iff `role` is a member of `required`.
    pub fn authorize(role: Role, required: &[Role]) -> bool {
        required.contains(&role)
    }

    /// Guard form of [`AccessGate::authorize`] for mutating operations.
    pub fn require(role: Role, required: &[Role]) -> Result<(), ConfigError> {
        if Self::authorize(role, required) {
            Ok(())
        } else {
            tracing::warn!(role = %role, "Denied configuration access");
            Err(ConfigError::Unauthorized { role })
        }
    }
}
