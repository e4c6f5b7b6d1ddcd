// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration Service
//!
//! Console-facing operations over both configuration domains, the named
//! resources and POC uploads.
//!
//! Every mutating operation follows the same shape: role check first, then a
//! single [`ConfigStore::update`] critical section, then a reload signal on
//! the [`EventBus`]. A denied caller never reaches the store or the disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::probe_engine::ProbeEngine;
use crate::domain::access::{AccessGate, Role, ADMIN_ROLES};
use crate::domain::agent_config::{
    AgentConfig, DomainscanConfig, FingerprintConfig, PocKind, PortscanConfig, ProxyConfig,
};
use crate::domain::chat::ChatSettings;
use crate::domain::coordinator_config::{
    CoordinatorConfig, NOTIFY_DINGTALK, NOTIFY_FEISHU, NOTIFY_SERVERCHAN,
};
use crate::domain::document::ConfigDocument;
use crate::domain::error::ConfigError;
use crate::domain::events::{ConfigEvent, ConfigSection};
use crate::domain::named_resource::{is_contained_relative, NamedResource};
use crate::domain::notifier::Notifier;
use crate::domain::probe::{ProbeError, ProbeReport, ProbeTarget};
use crate::domain::settings::Settings;
use crate::domain::view::ConfigView;
use crate::infrastructure::config_store::ConfigStore;
use crate::infrastructure::event_bus::{EventBus, EventBusNotifier};
use crate::infrastructure::file_store::{FileStore, LocalFileStore};
use crate::infrastructure::http_probe::http_probe_targets;
use crate::infrastructure::resource_registry::ResourceRegistry;

/// Message sent by [`ConfigService::test_notify`].
pub const TEST_NOTIFY_MESSAGE: &str = "This is a test message from Scoutline configuration management!";

/// Online search toggles and credentials saved together from the API tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiTokenUpdate {
    pub fofa: bool,
    pub quake: bool,
    pub hunter: bool,
    pub fofa_token: String,
    pub hunter_token: String,
    pub quake_token: String,
    pub icp_token: String,
    pub search_page_size: u32,
    pub search_limit_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortscanUpdate {
    pub cmdbin: String,
    pub port: String,
    pub rate: u32,
    pub tech: String,
    pub ping: bool,
}

pub struct ConfigService {
    root: PathBuf,
    coordinator: Arc<ConfigStore<CoordinatorConfig>>,
    agent: Arc<ConfigStore<AgentConfig>>,
    resources: ResourceRegistry,
    files: Arc<dyn FileStore>,
    events: EventBus,
    notifier: Arc<dyn Notifier>,
    engine: ProbeEngine,
    targets: Vec<Arc<dyn ProbeTarget>>,
    chat: parking_lot::RwLock<ChatSettings>,
}

impl ConfigService {
    /// Service over already opened stores. Named resources live under
    /// `<root>/thirdparty`; notifications go out on `events` and no probe
    /// targets are registered until [`ConfigService::with_probes`].
    pub fn new(
        root: impl Into<PathBuf>,
        coordinator: Arc<ConfigStore<CoordinatorConfig>>,
        agent: Arc<ConfigStore<AgentConfig>>,
        files: Arc<dyn FileStore>,
        events: EventBus,
    ) -> Self {
        let root = root.into();
        Self {
            resources: ResourceRegistry::new(root.join("thirdparty"), files.clone()),
            notifier: Arc::new(EventBusNotifier::new(events.clone())),
            root,
            coordinator,
            agent,
            files,
            events,
            engine: ProbeEngine::default(),
            targets: Vec::new(),
            chat: parking_lot::RwLock::new(ChatSettings::default()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_probes(mut self, engine: ProbeEngine, targets: Vec<Arc<dyn ProbeTarget>>) -> Self {
        self.engine = engine;
        self.targets = targets;
        self
    }

    /// Wire the service to the local filesystem as described by `settings`.
    ///
    /// Missing documents start from their defaults.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new());
        let coordinator = ConfigStore::open(settings.coordinator_config_path(), files.clone()).await?;
        let agent = ConfigStore::open(settings.agent_config_path(), files.clone()).await?;

        let service = Self::new(
            settings.root_path.clone(),
            Arc::new(coordinator),
            Arc::new(agent),
            files,
            EventBus::with_default_capacity(),
        )
        .with_probes(
            ProbeEngine::from_settings(&settings.probe),
            http_probe_targets(&settings.probe),
        );
        Ok(service)
    }

    pub fn coordinator_store(&self) -> &Arc<ConfigStore<CoordinatorConfig>> {
        &self.coordinator
    }

    pub fn agent_store(&self) -> &Arc<ConfigStore<AgentConfig>> {
        &self.agent
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn chat_settings(&self) -> ChatSettings {
        self.chat.read().clone()
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Scan defaults visible to every caller.
    pub async fn load_default_view(&self) -> Result<ConfigView, ConfigError> {
        let agent = fresh_snapshot(&self.agent).await?;
        Ok(ConfigView::for_public(&agent).with_version(self.read_version().await))
    }

    /// Full agent document for admins; everyone else gets the defaults view.
    pub async fn load_agent_view(&self, role: Role) -> Result<ConfigView, ConfigError> {
        if !AccessGate::authorize(role, ADMIN_ROLES) {
            debug!(role = %role, "Agent view requested without admin role, serving defaults");
            return self.load_default_view().await;
        }
        let agent = fresh_snapshot(&self.agent).await?;
        Ok(ConfigView::for_agent_admin(&agent).with_version(self.read_version().await))
    }

    pub async fn load_coordinator_view(&self, role: Role) -> Result<ConfigView, ConfigError> {
        AccessGate::require(role, ADMIN_ROLES)?;
        let coordinator = fresh_snapshot(&self.coordinator).await?;
        let chat = self.chat_settings();
        Ok(ConfigView::for_coordinator_admin(&coordinator, &chat)
            .with_version(self.read_version().await))
    }

    // ------------------------------------------------------------------
    // Coordinator document
    // ------------------------------------------------------------------

    pub async fn save_task_slices(
        &self,
        role: Role,
        ip_slice_number: u32,
        port_slice_number: u32,
    ) -> Result<Arc<CoordinatorConfig>, ConfigError> {
        self.apply(&*self.coordinator, role, ConfigSection::TaskSlices, |doc| {
            if ip_slice_number == 0 || port_slice_number == 0 {
                return Err(ConfigError::InvalidInput(
                    "slice numbers must be greater than zero".to_string(),
                ));
            }
            doc.task.ip_slice_number = ip_slice_number;
            doc.task.port_slice_number = port_slice_number;
            Ok(())
        })
        .await
    }

    pub async fn save_wiki_feishu(
        &self,
        role: Role,
        app_id: &str,
        app_secret: &str,
        refresh_token: &str,
    ) -> Result<Arc<CoordinatorConfig>, ConfigError> {
        self.apply(&*self.coordinator, role, ConfigSection::WikiFeishu, |doc| {
            let feishu = &mut doc.wiki.feishu;
            feishu.app_id = app_id.trim().to_string();
            feishu.app_secret = app_secret.trim().to_string();
            feishu.user_access_refresh_token = refresh_token.trim().to_string();
            Ok(())
        })
        .await
    }

    pub async fn save_task_notify(
        &self,
        role: Role,
        serverchan: &str,
        dingtalk: &str,
        feishu: &str,
    ) -> Result<Arc<CoordinatorConfig>, ConfigError> {
        self.apply(&*self.coordinator, role, ConfigSection::TaskNotify, |doc| {
            doc.set_notify_token(NOTIFY_SERVERCHAN, serverchan.trim());
            doc.set_notify_token(NOTIFY_DINGTALK, dingtalk.trim());
            doc.set_notify_token(NOTIFY_FEISHU, feishu.trim());
            Ok(())
        })
        .await
    }

    /// Send [`TEST_NOTIFY_MESSAGE`] through the configured channels.
    pub async fn test_notify(&self, role: Role) -> anyhow::Result<()> {
        AccessGate::require(role, ADMIN_ROLES)?;
        self.notifier.send(TEST_NOTIFY_MESSAGE).await?;
        info!("Test notification sent");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Agent document
    // ------------------------------------------------------------------

    pub async fn save_api_tokens(
        &self,
        role: Role,
        update: ApiTokenUpdate,
    ) -> Result<Arc<AgentConfig>, ConfigError> {
        self.apply(&*self.agent, role, ConfigSection::ApiTokens, move |doc| {
            if update.search_page_size == 0 || update.search_limit_count == 0 {
                return Err(ConfigError::InvalidInput(
                    "page size and limit count must be greater than zero".to_string(),
                ));
            }
            doc.online_api.is_fofa = update.fofa;
            doc.online_api.is_quake = update.quake;
            doc.online_api.is_hunter = update.hunter;
            doc.api.fofa.key = update.fofa_token.trim().to_string();
            doc.api.hunter.key = update.hunter_token.trim().to_string();
            doc.api.quake.key = update.quake_token.trim().to_string();
            doc.api.icp.key = update.icp_token.trim().to_string();
            doc.api.search_page_size = update.search_page_size;
            doc.api.search_limit_count = update.search_limit_count;
            Ok(())
        })
        .await
    }

    /// Probe every configured credential against its provider.
    ///
    /// The agent document is re-read first so keys saved by another
    /// coordinator process are tested too.
    pub async fn test_api_keys(&self, role: Role) -> Result<ProbeReport, ProbeError> {
        AccessGate::require(role, ADMIN_ROLES)?;
        let snapshot = fresh_snapshot(&self.agent).await?;
        self.engine.run_all(snapshot, &self.targets).await
    }

    pub async fn save_fingerprint(
        &self,
        role: Role,
        fingerprint: FingerprintConfig,
    ) -> Result<Arc<AgentConfig>, ConfigError> {
        self.apply(&*self.agent, role, ConfigSection::Fingerprint, move |doc| {
            doc.fingerprint = fingerprint;
            Ok(())
        })
        .await
    }

    /// Replace the proxy pool with the non-blank lines of `text`.
    pub async fn save_proxy(&self, role: Role, text: &str) -> Result<Arc<AgentConfig>, ConfigError> {
        self.apply(&*self.agent, role, ConfigSection::Proxy, |doc| {
            doc.proxy = ProxyConfig::from_lines(text);
            Ok(())
        })
        .await
    }

    pub async fn save_domainscan(
        &self,
        role: Role,
        domainscan: DomainscanConfig,
    ) -> Result<Arc<AgentConfig>, ConfigError> {
        self.apply(&*self.agent, role, ConfigSection::Domainscan, move |doc| {
            doc.domainscan = domainscan;
            Ok(())
        })
        .await
    }

    /// Unknown engines are saved as masscan.
    pub async fn save_portscan(
        &self,
        role: Role,
        update: PortscanUpdate,
    ) -> Result<Arc<AgentConfig>, ConfigError> {
        self.apply(&*self.agent, role, ConfigSection::Portscan, move |doc| {
            doc.portscan = PortscanConfig {
                cmdbin: PortscanConfig::normalize_cmdbin(&update.cmdbin),
                port: update.port.trim().to_string(),
                rate: update.rate,
                tech: update.tech.trim().to_string(),
                is_ping: update.ping,
            };
            Ok(())
        })
        .await
    }

    pub async fn save_filter(
        &self,
        role: Role,
        max_port_per_ip: u32,
        max_domain_per_ip: u32,
        title: &str,
    ) -> Result<Arc<AgentConfig>, ConfigError> {
        self.apply(&*self.agent, role, ConfigSection::Filter, |doc| {
            doc.filter.max_port_per_ip = max_port_per_ip;
            doc.filter.max_domain_per_ip = max_domain_per_ip;
            doc.filter.title = title.trim().to_string();
            Ok(())
        })
        .await
    }

    // ------------------------------------------------------------------
    // Chat room toggles (memory only)
    // ------------------------------------------------------------------

    pub fn update_chat_settings(&self, role: Role, settings: ChatSettings) -> Result<(), ConfigError> {
        AccessGate::require(role, ADMIN_ROLES)?;
        *self.chat.write() = settings;
        self.events.publish(ConfigEvent::ChatSettingsChanged {
            changed_at: chrono::Utc::now(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Named resources and POC uploads
    // ------------------------------------------------------------------

    pub async fn load_resource(&self, token: &str) -> Result<Vec<u8>, ConfigError> {
        self.resources.read(token).await
    }

    pub async fn save_resource(
        &self,
        role: Role,
        token: &str,
        contents: &[u8],
    ) -> Result<PathBuf, ConfigError> {
        let path = self.resources.write(role, token, contents).await?;
        let now = chrono::Utc::now();
        self.events.publish(ConfigEvent::ResourceSaved {
            token: token.to_string(),
            saved_at: now,
        });
        if token == NamedResource::TaskWorkspace.token() {
            self.events
                .publish(ConfigEvent::TaskWorkspaceChanged { changed_at: now });
        }
        Ok(path)
    }

    /// Save the custom task workspace map and tell the dispatcher to reload it.
    pub async fn save_task_workspace(&self, role: Role, contents: &[u8]) -> Result<PathBuf, ConfigError> {
        self.save_resource(role, NamedResource::TaskWorkspace.token(), contents)
            .await
    }

    /// Store an uploaded POC template in the directory configured for `kind`.
    ///
    /// `file_name` must be a bare `.yml`/`.yaml` name.
    pub async fn upload_poc(
        &self,
        role: Role,
        kind: PocKind,
        file_name: &str,
        contents: &[u8],
    ) -> Result<PathBuf, ConfigError> {
        AccessGate::require(role, ADMIN_ROLES)?;
        validate_poc_file_name(file_name)?;

        let agent = self.agent.current();
        let poc_dir = agent.pocscan.poc_path(kind);
        if poc_dir.is_empty() || !is_contained_relative(Path::new(poc_dir)) {
            warn!(kind = %kind, poc_path = %poc_dir, "Rejecting POC upload, poc path is not a relative directory");
            return Err(ConfigError::InvalidInput(format!(
                "poc path for {} is not configured",
                kind
            )));
        }

        let path = self.root.join(poc_dir).join(file_name);
        self.files
            .write(&path, contents)
            .await
            .map_err(|e| ConfigError::io(&path, e))?;

        info!(kind = %kind, file = %file_name, "POC uploaded");
        self.events.publish(ConfigEvent::PocUploaded {
            kind: kind.to_string(),
            file_name: file_name.to_string(),
            uploaded_at: chrono::Utc::now(),
        });
        Ok(path)
    }

    // ------------------------------------------------------------------

    async fn apply<D, F>(
        &self,
        store: &ConfigStore<D>,
        role: Role,
        section: ConfigSection,
        change: F,
    ) -> Result<Arc<D>, ConfigError>
    where
        D: ConfigDocument,
        F: FnOnce(&mut D) -> Result<(), ConfigError>,
    {
        AccessGate::require(role, ADMIN_ROLES)?;
        let document = store.update(change).await?;
        info!(domain = %D::DOMAIN, section = ?section, "Configuration section saved");
        self.events
            .publish(ConfigEvent::document_changed(D::DOMAIN, section));
        Ok(document)
    }

    async fn read_version(&self) -> Option<String> {
        let bytes = self.files.read(&self.root.join("version.txt")).await.ok()?;
        let version = String::from_utf8_lossy(&bytes).trim().to_string();
        if version.is_empty() {
            None
        } else {
            Some(version)
        }
    }
}

/// Re-read `store` from disk before serving it.
///
/// A document that was never written falls back to the in-memory snapshot;
/// any other read or parse failure goes back to the caller.
async fn fresh_snapshot<D: ConfigDocument>(store: &ConfigStore<D>) -> Result<Arc<D>, ConfigError> {
    match store.reload().await {
        Ok(snapshot) => Ok(snapshot),
        Err(e) if e.is_not_found() => {
            debug!(domain = %D::DOMAIN, "Document not on disk yet, serving current snapshot");
            Ok(store.current())
        }
        Err(e) => Err(e),
    }
}

fn validate_poc_file_name(file_name: &str) -> Result<(), ConfigError> {
    let bare = !file_name.is_empty()
        && !file_name.contains(['/', '\\'])
        && !file_name.contains("..");
    if !bare {
        return Err(ConfigError::InvalidInput(format!(
            "invalid poc file name '{}'",
            file_name
        )));
    }
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some("yml") | Some("yaml") => Ok(()),
        _ => Err(ConfigError::InvalidInput("invalid file type!".to_string())),
    }
}
