// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

// Subsystem Settings
//
// Bootstrap configuration for the configuration subsystem itself:
// - Installation root (holds version.txt and thirdparty/)
// - Locations of the coordinator and agent documents
// - Credential probe limits and provider endpoints

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::probe::ApiProvider;

/// Top-level settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Installation root; relative document paths resolve against it
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Coordinator document (default: "conf/server.yml")
    #[serde(default = "default_coordinator_config")]
    pub coordinator_config: PathBuf,

    /// Agent document (default: "conf/worker.yml")
    #[serde(default = "default_agent_config")]
    pub agent_config: PathBuf,

    #[serde(default)]
    pub probe: ProbeSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Maximum number of providers contacted at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Budget for a single provider call
    #[serde(default = "default_probe_timeout", with = "humantime_serde")]
    pub probe_timeout: Duration,

    /// Budget for a whole run; unset means wait for every provider
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Duration>,

    /// Liveness endpoint per provider
    #[serde(default)]
    pub endpoints: BTreeMap<ApiProvider, ProbeEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeEndpoint {
    pub url: String,

    /// Query parameter carrying the credential
    #[serde(default = "default_key_param")]
    pub key_param: String,

    /// Fixed query parameters sent with every probe (sample query, page size)
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            probe_timeout: default_probe_timeout(),
            deadline: None,
            endpoints: BTreeMap::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            coordinator_config: default_coordinator_config(),
            agent_config: default_agent_config(),
            probe: ProbeSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let settings = serde_yaml::from_str(yaml)?;
        Ok(settings)
    }

    /// Discover the settings file using precedence order
    /// 1. SCOUTLINE_CONFIG_PATH environment variable
    /// 2. ./scoutline.yaml (working directory)
    /// 3. ~/.scoutline/config.yaml (user home)
    /// 4. /etc/scoutline/config.yaml (system, Unix) or C:\ProgramData\Scoutline\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SCOUTLINE_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./scoutline.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".scoutline").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/scoutline/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Scoutline\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load settings with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // An explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading settings from explicit path: {:?}", path);
            let mut settings = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load settings at {:?}: {}", path, e)
            })?;
            settings.apply_env_overrides();
            return Ok(settings);
        }

        if let Some(settings_path) = Self::discover_config() {
            tracing::info!("Loading settings from discovered path: {:?}", settings_path);
            let mut settings = Self::from_yaml_file(settings_path)?;
            settings.apply_env_overrides();
            Ok(settings)
        } else {
            tracing::warn!("No settings file found in standard locations. Using defaults.");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            Ok(settings)
        }
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("SCOUTLINE_ROOT") {
            if !root.trim().is_empty() {
                tracing::info!("Environment override: SCOUTLINE_ROOT={}", root);
                self.root_path = PathBuf::from(root);
            }
        }

        if let Ok(val) = std::env::var("SCOUTLINE_PROBE_CONCURRENCY") {
            match val.trim().parse::<usize>() {
                Ok(n) if n > 0 => {
                    tracing::info!("Environment override: SCOUTLINE_PROBE_CONCURRENCY={}", n);
                    self.probe.concurrency = n;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for SCOUTLINE_PROBE_CONCURRENCY: '{}'. Expected a positive integer. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Validate settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.root_path.as_os_str().is_empty() {
            anyhow::bail!("root_path cannot be empty");
        }
        if self.coordinator_config.as_os_str().is_empty() {
            anyhow::bail!("coordinator_config cannot be empty");
        }
        if self.agent_config.as_os_str().is_empty() {
            anyhow::bail!("agent_config cannot be empty");
        }
        if self.coordinator_config_path() == self.agent_config_path() {
            anyhow::bail!("coordinator_config and agent_config must be different files");
        }
        if self.probe.concurrency == 0 {
            anyhow::bail!("probe.concurrency must be at least 1");
        }
        if self.probe.probe_timeout.is_zero() {
            anyhow::bail!("probe.probe_timeout must be greater than zero");
        }
        for (provider, endpoint) in &self.probe.endpoints {
            if endpoint.url.is_empty() {
                anyhow::bail!("probe endpoint url cannot be empty for: {}", provider);
            }
            if endpoint.key_param.is_empty() {
                anyhow::bail!("probe endpoint key_param cannot be empty for: {}", provider);
            }
        }
        Ok(())
    }

    pub fn coordinator_config_path(&self) -> PathBuf {
        self.root_path.join(&self.coordinator_config)
    }

    pub fn agent_config_path(&self) -> PathBuf {
        self.root_path.join(&self.agent_config)
    }

    /// Directory holding the named resources.
    pub fn resource_root(&self) -> PathBuf {
        self.root_path.join("thirdparty")
    }

    pub fn version_file(&self) -> PathBuf {
        self.root_path.join("version.txt")
    }
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_coordinator_config() -> PathBuf {
    PathBuf::from("conf/server.yml")
}

fn default_agent_config() -> PathBuf {
    PathBuf::from("conf/worker.yml")
}

fn default_concurrency() -> usize {
    4
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_key_param() -> String {
    "key".to_string()
}
