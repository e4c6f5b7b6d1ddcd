// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

// Agent Configuration Document
//
// Scan defaults pushed to every agent:
// - Port scan engine and rate
// - Fingerprint toggles
// - Online search API credentials and paging
// - Domain scan toggles
// - Outbound proxy pool
// - Result filters
// - POC template locations

use serde::{Deserialize, Serialize};
use std::fmt;

use super::document::{ConfigDocument, ConfigDomain};
use super::error::ConfigError;

/// Port scan engines an agent knows how to drive.
pub const PORTSCAN_ENGINES: &[&str] = &["masscan", "nmap", "gogo"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub portscan: PortscanConfig,
    pub fingerprint: FingerprintConfig,
    pub api: ApiConfig,
    #[serde(rename = "onlineapi")]
    pub online_api: OnlineApiConfig,
    pub domainscan: DomainscanConfig,
    pub proxy: ProxyConfig,
    pub filter: FilterConfig,
    pub pocscan: PocscanConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortscanConfig {
    /// One of [`PORTSCAN_ENGINES`]
    pub cmdbin: String,
    /// Port expression handed to the engine (e.g. "--top-ports 1000")
    pub port: String,
    /// Packets per second
    pub rate: u32,
    /// Scan technique flag (e.g. "-sS")
    pub tech: String,
    #[serde(rename = "ping")]
    pub is_ping: bool,
}

impl Default for PortscanConfig {
    fn default() -> Self {
        Self {
            cmdbin: default_cmdbin(),
            port: "--top-ports 1000".to_string(),
            rate: 1000,
            tech: "-sS".to_string(),
            is_ping: false,
        }
    }
}

impl PortscanConfig {
    /// Map an arbitrary engine name onto a supported one; unknown names fall
    /// back to masscan.
    pub fn normalize_cmdbin(cmdbin: &str) -> String {
        let cmdbin = cmdbin.trim();
        if PORTSCAN_ENGINES.contains(&cmdbin) {
            cmdbin.to_string()
        } else {
            default_cmdbin()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    #[serde(rename = "httpx")]
    pub is_httpx: bool,
    #[serde(rename = "screenshot")]
    pub is_screenshot: bool,
    #[serde(rename = "fingerprinthub")]
    pub is_fingerprint_hub: bool,
    #[serde(rename = "iconhash")]
    pub is_icon_hash: bool,
    #[serde(rename = "fingerprintx")]
    pub is_fingerprintx: bool,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            is_httpx: true,
            is_screenshot: false,
            is_fingerprint_hub: true,
            is_icon_hash: true,
            is_fingerprintx: false,
        }
    }
}

/// Credential for one external data provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKey {
    pub key: String,
}

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn is_configured(&self) -> bool {
        !self.key.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub fofa: ApiKey,
    pub hunter: ApiKey,
    pub quake: ApiKey,
    pub icp: ApiKey,
    pub search_page_size: u32,
    pub search_limit_count: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            fofa: ApiKey::default(),
            hunter: ApiKey::default(),
            quake: ApiKey::default(),
            icp: ApiKey::default(),
            search_page_size: 100,
            search_limit_count: 1000,
        }
    }
}

/// Which online search providers a default task queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlineApiConfig {
    #[serde(rename = "fofa")]
    pub is_fofa: bool,
    #[serde(rename = "quake")]
    pub is_quake: bool,
    #[serde(rename = "hunter")]
    pub is_hunter: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainscanConfig {
    pub wordlist: String,
    #[serde(rename = "subfinder")]
    pub is_subdomain_finder: bool,
    #[serde(rename = "subdomainbrute")]
    pub is_subdomain_brute: bool,
    #[serde(rename = "subdomaincrawler")]
    pub is_subdomain_crawler: bool,
    #[serde(rename = "ignorecdn")]
    pub is_ignore_cdn: bool,
    #[serde(rename = "ignoreoutofchina")]
    pub is_ignore_outof_china: bool,
    #[serde(rename = "portscan")]
    pub is_portscan: bool,
    #[serde(rename = "whois")]
    pub is_whois: bool,
    #[serde(rename = "icp")]
    pub is_icp: bool,
}

impl Default for DomainscanConfig {
    fn default() -> Self {
        Self {
            wordlist: "normal".to_string(),
            is_subdomain_finder: true,
            is_subdomain_brute: false,
            is_subdomain_crawler: false,
            is_ignore_cdn: true,
            is_ignore_outof_china: false,
            is_portscan: false,
            is_whois: false,
            is_icp: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub host: Vec<String>,
}

impl ProxyConfig {
    /// Build a host list from newline separated text, dropping blank lines.
    pub fn from_lines(text: &str) -> Self {
        let host = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { host }
    }

    pub fn to_lines(&self) -> String {
        self.host.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Hosts reporting more open ports than this are treated as tarpits
    pub max_port_per_ip: u32,
    /// IPs resolving for more domains than this are treated as shared hosting
    pub max_domain_per_ip: u32,
    /// Newline separated page titles to drop from results
    pub title: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_port_per_ip: 50,
            max_domain_per_ip: 100,
            title: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PocPath {
    pub poc_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PocscanConfig {
    pub xray: PocPath,
    pub nuclei: PocPath,
}

impl Default for PocscanConfig {
    fn default() -> Self {
        Self {
            xray: PocPath {
                poc_path: "thirdparty/xray/xray/pocs".to_string(),
            },
            nuclei: PocPath {
                poc_path: "thirdparty/nuclei/nuclei-templates".to_string(),
            },
        }
    }
}

impl PocscanConfig {
    /// Template directory for `kind`, relative to the installation root.
    pub fn poc_path(&self, kind: PocKind) -> &str {
        match kind {
            PocKind::Xray => &self.xray.poc_path,
            PocKind::Nuclei => &self.nuclei.poc_path,
        }
    }
}

/// POC template families agents can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PocKind {
    Xray,
    Nuclei,
}

impl PocKind {
    pub fn name(&self) -> &'static str {
        match self {
            PocKind::Xray => "xray",
            PocKind::Nuclei => "nuclei",
        }
    }
}

impl fmt::Display for PocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for PocKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xray" => Ok(PocKind::Xray),
            "nuclei" => Ok(PocKind::Nuclei),
            other => Err(ConfigError::InvalidInput(format!("unknown poc type '{}'", other))),
        }
    }
}

impl ConfigDocument for AgentConfig {
    const DOMAIN: ConfigDomain = ConfigDomain::Agent;

    fn validate(&self) -> Result<(), ConfigError> {
        if !PORTSCAN_ENGINES.contains(&self.portscan.cmdbin.as_str()) {
            return Err(ConfigError::InvalidInput(format!(
                "portscan.cmdbin must be one of {:?}, got '{}'",
                PORTSCAN_ENGINES, self.portscan.cmdbin
            )));
        }
        if self.portscan.rate == 0 {
            return Err(ConfigError::InvalidInput(
                "portscan.rate must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_cmdbin() -> String {
    "masscan".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_baseline() {
        let parsed = AgentConfig::from_yaml_str("").unwrap();
        assert_eq!(parsed, AgentConfig::default());

        let parsed = AgentConfig::from_yaml_str("{}").unwrap();
        assert_eq!(parsed, AgentConfig::default());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let yaml = r#"
portscan:
  cmdbin: nmap
api:
  fofa:
    key: abc
"#;
        let parsed = AgentConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(parsed.portscan.cmdbin, "nmap");
        assert_eq!(parsed.portscan.rate, 1000);
        assert_eq!(parsed.api.fofa.key, "abc");
        assert_eq!(parsed.api.search_page_size, 100);
        assert_eq!(parsed.filter, FilterConfig::default());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = AgentConfig::default();
        config.api.hunter = ApiKey::new("hunter-key");
        config.proxy = ProxyConfig::from_lines("socks5://10.0.0.1:1080\n");
        config.online_api.is_quake = true;

        let yaml = config.to_yaml_string().unwrap();
        let parsed = AgentConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_proxy_lines_are_trimmed() {
        let proxy = ProxyConfig::from_lines("  http://a:8080 \n\n\t\nsocks5://b:1080\n   ");
        assert_eq!(proxy.host, vec!["http://a:8080", "socks5://b:1080"]);
        assert_eq!(proxy.to_lines(), "http://a:8080\nsocks5://b:1080");
    }

    #[test]
    fn test_cmdbin_normalization() {
        assert_eq!(PortscanConfig::normalize_cmdbin("nmap"), "nmap");
        assert_eq!(PortscanConfig::normalize_cmdbin(" gogo "), "gogo");
        assert_eq!(PortscanConfig::normalize_cmdbin("zmap"), "masscan");
        assert_eq!(PortscanConfig::normalize_cmdbin(""), "masscan");
    }

    #[test]
    fn test_validation() {
        let mut config = AgentConfig::default();
        assert!(config.validate().is_ok());

        config.portscan.cmdbin = "zmap".to_string();
        assert!(config.validate().is_err());
        config.portscan.cmdbin = "nmap".to_string();

        config.portscan.rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poc_paths() {
        let pocscan = PocscanConfig::default();
        assert_eq!(pocscan.poc_path(PocKind::Xray), "thirdparty/xray/xray/pocs");
        assert_eq!("nuclei".parse::<PocKind>().unwrap(), PocKind::Nuclei);
        assert!("goby".parse::<PocKind>().is_err());
    }

    #[test]
    fn test_api_key_presence() {
        assert!(!ApiKey::default().is_configured());
        assert!(!ApiKey::new("   ").is_configured());
        assert!(ApiKey::new("k").is_configured());
    }
}
