// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Caller-facing configuration view.
//!
//! The console works with one flat record regardless of which domain a value
//! lives in. [`ConfigView`] is that record; the `for_*` constructors decide
//! which fields a given audience gets to see. Fields outside the audience keep
//! their zero value.

use serde::{Deserialize, Serialize};

use super::agent_config::AgentConfig;
use super::chat::ChatSettings;
use super::coordinator_config::{
    CoordinatorConfig, NOTIFY_DINGTALK, NOTIFY_FEISHU, NOTIFY_SERVERCHAN,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigView {
    // portscan
    pub cmdbin: String,
    pub port: String,
    pub rate: u32,
    pub tech: String,
    pub ping: bool,
    // task
    #[serde(rename = "ipslicenumber")]
    pub ip_slice_number: u32,
    #[serde(rename = "portslicenumber")]
    pub port_slice_number: u32,
    pub version: String,
    // fingerprint
    pub httpx: bool,
    pub screenshot: bool,
    #[serde(rename = "fingerprinthub")]
    pub fingerprint_hub: bool,
    #[serde(rename = "iconhash")]
    pub icon_hash: bool,
    pub fingerprintx: bool,
    // online api
    pub fofa: bool,
    pub quake: bool,
    pub hunter: bool,
    #[serde(rename = "serverchan")]
    pub serverchan_token: String,
    #[serde(rename = "dingtalk")]
    pub dingtalk_token: String,
    #[serde(rename = "feishu")]
    pub feishu_token: String,
    #[serde(rename = "fofatoken")]
    pub fofa_token: String,
    #[serde(rename = "huntertoken")]
    pub hunter_token: String,
    #[serde(rename = "quaketoken")]
    pub quake_token: String,
    #[serde(rename = "chinaztoken")]
    pub icp_token: String,
    #[serde(rename = "pagesize")]
    pub search_page_size: u32,
    #[serde(rename = "limitcount")]
    pub search_limit_count: u32,
    // domainscan
    pub wordlist: String,
    pub subfinder: bool,
    #[serde(rename = "subdomainbrute")]
    pub subdomain_brute: bool,
    #[serde(rename = "subdomaincrawler")]
    pub subdomain_crawler: bool,
    #[serde(rename = "ignorecdn")]
    pub ignore_cdn: bool,
    #[serde(rename = "ignoreoutofchina")]
    pub ignore_outof_china: bool,
    pub portscan: bool,
    pub whois: bool,
    pub icp: bool,
    // proxy
    #[serde(rename = "proxyList")]
    pub proxy_list: String,
    // wiki
    #[serde(rename = "feishuappid")]
    pub feishu_app_id: String,
    #[serde(rename = "feishusecret")]
    pub feishu_app_secret: String,
    #[serde(rename = "feishurefreshtoken")]
    pub feishu_refresh_token: String,
    // filter
    #[serde(rename = "maxportperip")]
    pub max_port_per_ip: u32,
    #[serde(rename = "maxdomainperip")]
    pub max_domain_per_ip: u32,
    pub title: String,
    // chat
    pub anonymous: bool,
    #[serde(rename = "notdelfiledir")]
    pub not_del_file_dir: bool,
    #[serde(rename = "loadhistory")]
    pub load_history: bool,
    #[serde(rename = "maxhistorymessage")]
    pub max_history_message: u32,
}

impl ConfigView {
    /// Scan defaults any caller may see: no credentials, proxies or filters.
    pub fn for_public(agent: &AgentConfig) -> Self {
        let mut view = Self::default();
        view.fill_scan_defaults(agent);
        view
    }

    /// Everything in the agent document.
    pub fn for_agent_admin(agent: &AgentConfig) -> Self {
        let mut view = Self::default();
        view.fill_scan_defaults(agent);

        view.fofa_token = agent.api.fofa.key.clone();
        view.hunter_token = agent.api.hunter.key.clone();
        view.quake_token = agent.api.quake.key.clone();
        view.icp_token = agent.api.icp.key.clone();
        view.search_page_size = agent.api.search_page_size;
        view.search_limit_count = agent.api.search_limit_count;

        view.wordlist = agent.domainscan.wordlist.clone();

        view.max_port_per_ip = agent.filter.max_port_per_ip;
        view.max_domain_per_ip = agent.filter.max_domain_per_ip;
        view.title = agent.filter.title.clone();

        view.proxy_list = agent.proxy.to_lines();
        view
    }

    pub fn for_coordinator_admin(coordinator: &CoordinatorConfig, chat: &ChatSettings) -> Self {
        Self {
            ip_slice_number: coordinator.task.ip_slice_number,
            port_slice_number: coordinator.task.port_slice_number,
            serverchan_token: coordinator.notify_token(NOTIFY_SERVERCHAN).to_string(),
            dingtalk_token: coordinator.notify_token(NOTIFY_DINGTALK).to_string(),
            feishu_token: coordinator.notify_token(NOTIFY_FEISHU).to_string(),
            feishu_app_id: coordinator.wiki.feishu.app_id.clone(),
            feishu_app_secret: coordinator.wiki.feishu.app_secret.clone(),
            feishu_refresh_token: coordinator.wiki.feishu.user_access_refresh_token.clone(),
            anonymous: chat.anonymous,
            not_del_file_dir: chat.not_del_file_dir,
            load_history: chat.load_history,
            max_history_message: chat.max_history_message,
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version.unwrap_or_default();
        self
    }

    fn fill_scan_defaults(&mut self, agent: &AgentConfig) {
        let portscan = &agent.portscan;
        self.cmdbin = portscan.cmdbin.clone();
        self.port = portscan.port.clone();
        self.rate = portscan.rate;
        self.tech = portscan.tech.clone();
        self.ping = portscan.is_ping;

        let fingerprint = &agent.fingerprint;
        self.httpx = fingerprint.is_httpx;
        self.screenshot = fingerprint.is_screenshot;
        self.fingerprint_hub = fingerprint.is_fingerprint_hub;
        self.icon_hash = fingerprint.is_icon_hash;
        self.fingerprintx = fingerprint.is_fingerprintx;

        let domainscan = &agent.domainscan;
        self.subfinder = domainscan.is_subdomain_finder;
        self.subdomain_brute = domainscan.is_subdomain_brute;
        self.subdomain_crawler = domainscan.is_subdomain_crawler;
        self.ignore_cdn = domainscan.is_ignore_cdn;
        self.ignore_outof_china = domainscan.is_ignore_outof_china;
        self.portscan = domainscan.is_portscan;
        self.whois = domainscan.is_whois;
        self.icp = domainscan.is_icp;

        self.fofa = agent.online_api.is_fofa;
        self.hunter = agent.online_api.is_hunter;
        self.quake = agent.online_api.is_quake;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent_config::ApiKey;

    fn sample_agent() -> AgentConfig {
        let mut agent = AgentConfig::default();
        agent.api.fofa = ApiKey::new("fofa-secret");
        agent.proxy.host = vec!["http://p1".to_string(), "http://p2".to_string()];
        agent.filter.title = "Welcome to nginx".to_string();
        agent.online_api.is_fofa = true;
        agent
    }

    #[test]
    fn test_public_view_hides_credentials() {
        let view = ConfigView::for_public(&sample_agent());
        assert!(view.fofa);
        assert_eq!(view.cmdbin, "masscan");
        assert!(view.fofa_token.is_empty());
        assert!(view.proxy_list.is_empty());
        assert!(view.title.is_empty());
        assert_eq!(view.max_port_per_ip, 0);
    }

    #[test]
    fn test_admin_view_exposes_agent_document() {
        let view = ConfigView::for_agent_admin(&sample_agent());
        assert_eq!(view.fofa_token, "fofa-secret");
        assert_eq!(view.proxy_list, "http://p1\nhttp://p2");
        assert_eq!(view.title, "Welcome to nginx");
        assert_eq!(view.search_page_size, 100);
    }

    #[test]
    fn test_json_field_names() {
        let view = ConfigView::for_agent_admin(&sample_agent()).with_version(Some("v3.1".into()));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["fofatoken"], "fofa-secret");
        assert_eq!(json["proxyList"], "http://p1\nhttp://p2");
        assert_eq!(json["version"], "v3.1");
        assert_eq!(json["ping"], false);
    }

    #[test]
    fn test_coordinator_view() {
        let mut coordinator = CoordinatorConfig::default();
        coordinator.set_notify_token(NOTIFY_FEISHU, "hook");
        let chat = ChatSettings::default();

        let view = ConfigView::for_coordinator_admin(&coordinator, &chat);
        assert_eq!(view.ip_slice_number, 64);
        assert_eq!(view.feishu_token, "hook");
        assert!(view.dingtalk_token.is_empty());
        assert_eq!(view.max_history_message, chat.max_history_message);
        assert!(view.cmdbin.is_empty());
    }
}
