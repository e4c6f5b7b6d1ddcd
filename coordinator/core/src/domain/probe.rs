// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Credential Probes
//!
//! A [`ProbeTarget`] is a named external data provider whose stored credential
//! can be checked for liveness. Targets only ever *read* the agent document.
//! The network call itself lives behind [`CredentialProbe`], so the
//! [`crate::application::probe_engine::ProbeEngine`] can be exercised without
//! reaching a real provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::agent_config::{AgentConfig, ApiKey};
use super::error::ConfigError;

/// What a provider answered for a stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFinding {
    /// The provider returned at least one usable result
    pub found: bool,
    pub detail: Option<String>,
}

impl ProbeFinding {
    pub fn found() -> Self {
        Self {
            found: true,
            detail: None,
        }
    }

    pub fn empty(detail: impl Into<String>) -> Self {
        Self {
            found: false,
            detail: Some(detail.into()),
        }
    }
}

/// Narrow capability consumed by targets: "given this credential, does the
/// provider return anything?"
#[async_trait]
pub trait CredentialProbe: Send + Sync {
    async fn probe(&self, credential: &str) -> anyhow::Result<ProbeFinding>;
}

#[async_trait]
pub trait ProbeTarget: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this target is configured in `config` and should be scheduled.
    fn is_enabled(&self, config: &AgentConfig) -> bool;

    async fn probe(&self, config: &AgentConfig) -> anyhow::Result<ProbeFinding>;
}

/// Outcome of one target within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub target: String,
    pub success: bool,
    pub message: String,
}

impl ProbeResult {
    pub fn ok(target: &str) -> Self {
        Self {
            target: target.to_string(),
            success: true,
            message: format!("{}: OK!", target),
        }
    }

    pub fn fail(target: &str, reason: Option<&str>) -> Self {
        let message = match reason {
            Some(reason) if !reason.is_empty() => format!("{}: fail ({})", target, reason),
            _ => format!("{}: fail", target),
        };
        Self {
            target: target.to_string(),
            success: false,
            message,
        }
    }
}

/// Aggregated output of a probe run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// One line per result, in arrival order
    pub text: String,
    pub results: Vec<ProbeResult>,
    /// The overall deadline expired before every target reported
    pub partial: bool,
}

impl ProbeReport {
    /// True iff at least one target succeeded.
    pub fn success(&self) -> bool {
        self.results.iter().any(|r| r.success)
    }

    pub fn result_for(&self, target: &str) -> Option<&ProbeResult> {
        self.results.iter().find(|r| r.target == target)
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no API credentials are configured")]
    NoTargetsConfigured,

    #[error("probe aggregator stopped before acknowledging")]
    AggregatorLost,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// External data providers with a credential slot in [`crate::domain::agent_config::ApiConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    Fofa,
    Hunter,
    Quake,
    Icp,
}

impl ApiProvider {
    pub const ALL: [ApiProvider; 4] = [
        ApiProvider::Fofa,
        ApiProvider::Hunter,
        ApiProvider::Quake,
        ApiProvider::Icp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ApiProvider::Fofa => "fofa",
            ApiProvider::Hunter => "hunter",
            ApiProvider::Quake => "quake",
            ApiProvider::Icp => "icp",
        }
    }

    pub fn key<'a>(&self, config: &'a AgentConfig) -> &'a ApiKey {
        match self {
            ApiProvider::Fofa => &config.api.fofa,
            ApiProvider::Hunter => &config.api.hunter,
            ApiProvider::Quake => &config.api.quake,
            ApiProvider::Icp => &config.api.icp,
        }
    }
}

impl fmt::Display for ApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target backed by one API key slot of the agent document.
pub struct ApiKeyTarget {
    provider: ApiProvider,
    capability: Arc<dyn CredentialProbe>,
}

impl ApiKeyTarget {
    pub fn new(provider: ApiProvider, capability: Arc<dyn CredentialProbe>) -> Self {
        Self {
            provider,
            capability,
        }
    }

    pub fn provider(&self) -> ApiProvider {
        self.provider
    }
}

#[async_trait]
impl ProbeTarget for ApiKeyTarget {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn is_enabled(&self, config: &AgentConfig) -> bool {
        self.provider.key(config).is_configured()
    }

    async fn probe(&self, config: &AgentConfig) -> anyhow::Result<ProbeFinding> {
        let key = self.provider.key(config);
        self.capability.probe(key.key.trim()).await
    }
}

/// One target per [`ApiProvider`], each resolving its capability through
/// `capability_for`.
pub fn api_key_targets<F>(mut capability_for: F) -> Vec<Arc<dyn ProbeTarget>>
where
    F: FnMut(ApiProvider) -> Arc<dyn CredentialProbe>,
{
    ApiProvider::ALL
        .iter()
        .map(|provider| {
            Arc::new(ApiKeyTarget::new(*provider, capability_for(*provider))) as Arc<dyn ProbeTarget>
        })
        .collect()
}
