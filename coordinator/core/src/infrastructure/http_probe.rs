// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! HTTP Credential Probe
//!
//! Checks a provider credential by issuing one sample query against the
//! provider's search endpoint.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Network side of [`CredentialProbe`]
//! - **Integration:** ProbeEngine → ApiKeyTarget → HttpCredentialProbe → provider API

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

use crate::domain::probe::{
    api_key_targets, ApiProvider, CredentialProbe, ProbeFinding, ProbeTarget,
};
use crate::domain::settings::{ProbeEndpoint, ProbeSettings};

/// A provider answered "found" when the request succeeded and the body is
/// not empty. Providers that report errors inside a 200 response
/// (`{"error": true, "errmsg": ...}`) count as empty.
pub struct HttpCredentialProbe {
    provider: ApiProvider,
    endpoint: ProbeEndpoint,
    client: Client,
}

impl HttpCredentialProbe {
    pub fn new(provider: ApiProvider, endpoint: ProbeEndpoint) -> Self {
        Self::with_client(provider, endpoint, Client::new())
    }

    pub fn with_client(provider: ApiProvider, endpoint: ProbeEndpoint, client: Client) -> Self {
        Self {
            provider,
            endpoint,
            client,
        }
    }
}

#[async_trait]
impl CredentialProbe for HttpCredentialProbe {
    async fn probe(&self, credential: &str) -> Result<ProbeFinding> {
        let mut query: Vec<(&str, &str)> = self
            .endpoint
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        query.push((self.endpoint.key_param.as_str(), credential));

        let response = self
            .client
            .get(&self.endpoint.url)
            .header("User-Agent", "Scoutline/1.0")
            .query(&query)
            .send()
            .await
            .with_context(|| format!("{} request failed", self.provider))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP {}", status));
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} response", self.provider))?;
        debug!(provider = %self.provider, bytes = body.len(), "Probe response received");

        Ok(interpret_body(&body))
    }
}

fn interpret_body(body: &str) -> ProbeFinding {
    let body = body.trim();
    if body.is_empty() {
        return ProbeFinding::empty("empty response");
    }
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if json.get("error").and_then(|v| v.as_bool()) == Some(true) {
            let message = json
                .get("errmsg")
                .and_then(|v| v.as_str())
                .unwrap_or("provider reported an error");
            return ProbeFinding::empty(message);
        }
    }
    ProbeFinding::found()
}

/// Stand-in for providers that have no endpoint configured.
pub struct UnconfiguredProbe {
    provider: ApiProvider,
}

#[async_trait]
impl CredentialProbe for UnconfiguredProbe {
    async fn probe(&self, _credential: &str) -> Result<ProbeFinding> {
        Err(anyhow!("no probe endpoint configured for {}", self.provider))
    }
}

/// Default target set: one [`crate::domain::probe::ApiKeyTarget`] per
/// provider, backed by HTTP where an endpoint is configured.
pub fn http_probe_targets(settings: &ProbeSettings) -> Vec<Arc<dyn ProbeTarget>> {
    let client = Client::new();
    api_key_targets(|provider| match settings.endpoints.get(&provider) {
        Some(endpoint) => Arc::new(HttpCredentialProbe::with_client(
            provider,
            endpoint.clone(),
            client.clone(),
        )) as Arc<dyn CredentialProbe>,
        None => Arc::new(UnconfiguredProbe { provider }) as Arc<dyn CredentialProbe>,
    })
}
