// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use parking_lot::Mutex;
use scoutline_core::application::config_service::{
    ApiTokenUpdate, ConfigService, PortscanUpdate, TEST_NOTIFY_MESSAGE,
};
use scoutline_core::application::probe_engine::ProbeEngine;
use scoutline_core::domain::access::Role;
use scoutline_core::domain::agent_config::{AgentConfig, PocKind};
use scoutline_core::domain::chat::ChatSettings;
use scoutline_core::domain::coordinator_config::{CoordinatorConfig, NOTIFY_FEISHU};
use scoutline_core::domain::document::{ConfigDocument, ConfigDomain};
use scoutline_core::domain::error::ConfigError;
use scoutline_core::domain::events::{ConfigEvent, ConfigSection};
use scoutline_core::domain::notifier::Notifier;
use scoutline_core::domain::probe::{
    api_key_targets, CredentialProbe, ProbeError, ProbeFinding,
};
use scoutline_core::infrastructure::config_store::ConfigStore;
use scoutline_core::infrastructure::event_bus::EventBus;
use scoutline_core::infrastructure::file_store::{FileStore, LocalFileStore};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts every call and forwards to the local filesystem.
#[derive(Default)]
struct SpyFileStore {
    inner: LocalFileStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl SpyFileStore {
    fn calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst) + self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileStore for SpyFileStore {
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write(path, contents).await
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> anyhow::Result<()> {
        self.sent.lock().push(message.to_string());
        Ok(())
    }
}

struct KeyEquals(&'static str);

#[async_trait]
impl CredentialProbe for KeyEquals {
    async fn probe(&self, credential: &str) -> anyhow::Result<ProbeFinding> {
        if credential == self.0 {
            Ok(ProbeFinding::found())
        } else {
            Ok(ProbeFinding::empty("invalid key"))
        }
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    files: Arc<SpyFileStore>,
    service: ConfigService,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let files = Arc::new(SpyFileStore::default());
    let shared: Arc<dyn FileStore> = files.clone();

    let coordinator = ConfigStore::open(root.join("conf/server.yml"), shared.clone())
        .await
        .unwrap();
    let agent = ConfigStore::open(root.join("conf/worker.yml"), shared.clone())
        .await
        .unwrap();

    let service = ConfigService::new(
        root.clone(),
        Arc::new(coordinator),
        Arc::new(agent),
        shared,
        EventBus::with_default_capacity(),
    )
    .with_probes(
        ProbeEngine::new(4, Duration::from_secs(5)),
        api_key_targets(|_| Arc::new(KeyEquals("valid")) as Arc<dyn CredentialProbe>),
    );

    Fixture {
        _dir: dir,
        root,
        files,
        service,
    }
}

fn read_agent(root: &Path) -> AgentConfig {
    AgentConfig::from_yaml_str(&std::fs::read_to_string(root.join("conf/worker.yml")).unwrap())
        .unwrap()
}

#[tokio::test]
async fn test_unknown_resource_never_touches_storage() {
    let fx = fixture().await;
    let before = fx.files.calls();

    let err = fx.service.load_resource("../../etc/shadow").await.unwrap_err();
    assert!(matches!(err, ConfigError::UnknownResource(_)));

    let err = fx
        .service
        .save_resource(Role::SuperAdmin, "not_a_resource", b"x")
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownResource(_)));

    assert_eq!(fx.service.resources().resolve("not_a_resource"), None);
    assert_eq!(fx.files.calls(), before);
}

#[tokio::test]
async fn test_denied_mutation_touches_nothing() {
    let fx = fixture().await;
    fx.service.save_proxy(Role::Admin, "http://a:8080").await.unwrap();
    let before = fx.files.calls();
    let snapshot = fx.service.agent_store().current();

    for role in [Role::Guest, Role::Anonymous] {
        let err = fx.service.save_proxy(role, "http://evil:1").await.unwrap_err();
        assert!(matches!(err, ConfigError::Unauthorized { .. }));
        let err = fx
            .service
            .save_resource(role, "black_ip", b"1.2.3.4")
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Unauthorized { .. }));
        let err = fx
            .service
            .upload_poc(role, PocKind::Xray, "poc.yml", b"id: x")
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Unauthorized { .. }));
    }

    assert_eq!(fx.files.calls(), before);
    assert!(Arc::ptr_eq(&snapshot, &fx.service.agent_store().current()));
    assert_eq!(read_agent(&fx.root).proxy.host, vec!["http://a:8080"]);
    assert!(!fx.root.join("thirdparty/custom/black_ip.txt").exists());
}

#[tokio::test]
async fn test_agent_view_falls_back_for_guests() {
    let fx = fixture().await;
    fx.service
        .save_api_tokens(
            Role::Admin,
            ApiTokenUpdate {
                fofa: true,
                fofa_token: "secret".to_string(),
                search_page_size: 50,
                search_limit_count: 500,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let guest = fx.service.load_agent_view(Role::Guest).await.unwrap();
    assert_eq!(guest, fx.service.load_default_view().await.unwrap());
    assert!(guest.fofa);
    assert!(guest.fofa_token.is_empty());

    let admin = fx.service.load_agent_view(Role::Admin).await.unwrap();
    assert_eq!(admin.fofa_token, "secret");
    assert_eq!(admin.search_page_size, 50);
}

#[tokio::test]
async fn test_coordinator_view_requires_admin() {
    let fx = fixture().await;
    let err = fx
        .service
        .load_coordinator_view(Role::Guest)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Unauthorized { role: Role::Guest }));

    std::fs::write(fx.root.join("version.txt"), "v2.9.1\n").unwrap();
    fx.service
        .save_task_notify(Role::SuperAdmin, "", "", " feishu-hook ")
        .await
        .unwrap();
    let view = fx
        .service
        .load_coordinator_view(Role::SuperAdmin)
        .await
        .unwrap();
    assert_eq!(view.feishu_token, "feishu-hook");
    assert_eq!(view.version, "v2.9.1");
    assert!(view.load_history);
}

#[tokio::test]
async fn test_save_publishes_reload_signal() {
    let fx = fixture().await;
    let mut events = fx.service.events().subscribe();

    fx.service
        .save_task_slices(Role::Admin, 32, 500)
        .await
        .unwrap();

    match events.recv().await.unwrap() {
        ConfigEvent::DocumentChanged {
            domain, section, ..
        } => {
            assert_eq!(domain, ConfigDomain::Coordinator);
            assert_eq!(section, ConfigSection::TaskSlices);
        }
        other => panic!("unexpected event {:?}", other),
    }

    let on_disk = CoordinatorConfig::from_yaml_str(
        &std::fs::read_to_string(fx.root.join("conf/server.yml")).unwrap(),
    )
    .unwrap();
    assert_eq!(on_disk.task.ip_slice_number, 32);
    assert_eq!(on_disk.task.port_slice_number, 500);
}

#[tokio::test]
async fn test_zero_slices_rejected() {
    let fx = fixture().await;
    let err = fx
        .service
        .save_task_slices(Role::Admin, 0, 500)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidInput(_)));
    assert!(!fx.root.join("conf/server.yml").exists());
}

#[tokio::test]
async fn test_proxy_and_portscan_normalization() {
    let fx = fixture().await;
    fx.service
        .save_proxy(Role::Admin, " socks5://10.0.0.1:1080 \n\n  \nhttp://10.0.0.2:3128\n")
        .await
        .unwrap();
    fx.service
        .save_portscan(
            Role::Admin,
            PortscanUpdate {
                cmdbin: "zmap".to_string(),
                port: "80,443".to_string(),
                rate: 500,
                tech: "-sT".to_string(),
                ping: true,
            },
        )
        .await
        .unwrap();

    let agent = read_agent(&fx.root);
    assert_eq!(
        agent.proxy.host,
        vec!["socks5://10.0.0.1:1080", "http://10.0.0.2:3128"]
    );
    assert_eq!(agent.portscan.cmdbin, "masscan");
    assert_eq!(agent.portscan.port, "80,443");
    assert!(agent.portscan.is_ping);
}

#[tokio::test]
async fn test_save_keeps_changes_made_by_another_process() {
    let fx = fixture().await;
    fx.service.save_filter(Role::Admin, 10, 20, "").await.unwrap();

    // Another coordinator process edits the file directly
    let mut external = read_agent(&fx.root);
    external.domainscan.wordlist = "large".to_string();
    std::fs::write(
        fx.root.join("conf/worker.yml"),
        external.to_yaml_string().unwrap(),
    )
    .unwrap();

    fx.service.save_proxy(Role::Admin, "http://p:1").await.unwrap();

    let agent = read_agent(&fx.root);
    assert_eq!(agent.domainscan.wordlist, "large");
    assert_eq!(agent.filter.max_port_per_ip, 10);
    assert_eq!(agent.proxy.host, vec!["http://p:1"]);
}

#[tokio::test]
async fn test_views_reflect_edits_made_on_disk() {
    let fx = fixture().await;
    fx.service
        .save_api_tokens(
            Role::Admin,
            ApiTokenUpdate {
                fofa_token: "old".to_string(),
                search_page_size: 100,
                search_limit_count: 1000,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut agent = read_agent(&fx.root);
    agent.api.fofa.key = "new".to_string();
    std::fs::write(fx.root.join("conf/worker.yml"), agent.to_yaml_string().unwrap()).unwrap();

    let mut coordinator = CoordinatorConfig::default();
    coordinator.task.ip_slice_number = 77;
    std::fs::write(
        fx.root.join("conf/server.yml"),
        coordinator.to_yaml_string().unwrap(),
    )
    .unwrap();

    let view = fx.service.load_agent_view(Role::Admin).await.unwrap();
    assert_eq!(view.fofa_token, "new");
    let view = fx.service.load_coordinator_view(Role::Admin).await.unwrap();
    assert_eq!(view.ip_slice_number, 77);
    assert_eq!(fx.service.agent_store().current().api.fofa.key, "new");
}

#[tokio::test]
async fn test_views_report_corrupt_documents() {
    let fx = fixture().await;

    // Nothing on disk yet: views come from the in-memory defaults
    let view = fx.service.load_default_view().await.unwrap();
    assert_eq!(view, fx.service.load_agent_view(Role::Guest).await.unwrap());

    std::fs::create_dir_all(fx.root.join("conf")).unwrap();
    std::fs::write(fx.root.join("conf/worker.yml"), "api: [unterminated").unwrap();
    std::fs::write(fx.root.join("conf/server.yml"), "task: {ip_slice_number: x").unwrap();

    let err = fx.service.load_default_view().await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    let err = fx.service.load_agent_view(Role::Admin).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    let err = fx
        .service
        .load_coordinator_view(Role::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[tokio::test]
async fn test_api_key_probe_run() {
    let fx = fixture().await;
    let err = fx.service.test_api_keys(Role::Admin).await.unwrap_err();
    assert!(matches!(err, ProbeError::NoTargetsConfigured));

    fx.service
        .save_api_tokens(
            Role::Admin,
            ApiTokenUpdate {
                fofa_token: "valid".to_string(),
                quake_token: "expired".to_string(),
                search_page_size: 100,
                search_limit_count: 1000,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let report = fx.service.test_api_keys(Role::Admin).await.unwrap();
    assert!(report.success());
    assert_eq!(report.results.len(), 2);
    assert!(report.text.contains("fofa: OK!"));
    assert!(report.text.contains("quake: fail (invalid key)"));

    let err = fx.service.test_api_keys(Role::Guest).await.unwrap_err();
    assert!(matches!(err, ProbeError::Config(ConfigError::Unauthorized { .. })));
}

#[tokio::test]
async fn test_task_workspace_save_signals_dispatcher() {
    let fx = fixture().await;
    let mut events = fx.service.events().subscribe();

    let path = fx
        .service
        .save_task_workspace(Role::Admin, b"workspace-guid\n")
        .await
        .unwrap();
    assert_eq!(path, fx.root.join("thirdparty/custom/task_workspace.txt"));
    assert_eq!(
        fx.service.load_resource("task_workspace").await.unwrap(),
        b"workspace-guid\n"
    );

    assert!(matches!(
        events.recv().await.unwrap(),
        ConfigEvent::ResourceSaved { .. }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        ConfigEvent::TaskWorkspaceChanged { .. }
    ));
}

#[tokio::test]
async fn test_poc_upload() {
    let fx = fixture().await;

    let path = fx
        .service
        .upload_poc(Role::Admin, PocKind::Nuclei, "cve-2024-0001.yaml", b"id: cve")
        .await
        .unwrap();
    assert_eq!(
        path,
        fx.root
            .join("thirdparty/nuclei/nuclei-templates/cve-2024-0001.yaml")
    );
    assert_eq!(std::fs::read(&path).unwrap(), b"id: cve");

    for bad in ["poc.txt", "../poc.yml", "nested/poc.yml"] {
        let err = fx
            .service
            .upload_poc(Role::Admin, PocKind::Xray, bad, b"id: x")
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInput(_)), "{} accepted", bad);
    }
}

#[tokio::test]
async fn test_notify_and_chat_settings() {
    let fx = fixture().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let service = fx.service.with_notifier(notifier.clone());

    assert!(service.test_notify(Role::Guest).await.is_err());
    service.test_notify(Role::Admin).await.unwrap();
    assert_eq!(*notifier.sent.lock(), vec![TEST_NOTIFY_MESSAGE.to_string()]);

    let chat = ChatSettings {
        anonymous: true,
        max_history_message: 50,
        ..Default::default()
    };
    assert!(service.update_chat_settings(Role::Guest, chat.clone()).is_err());
    service.update_chat_settings(Role::Admin, chat.clone()).unwrap();
    assert_eq!(service.chat_settings(), chat);

    let view = service.load_coordinator_view(Role::Admin).await.unwrap();
    assert!(view.anonymous);
    assert_eq!(view.max_history_message, 50);

    // Chat toggles are never persisted
    let coordinator = service.coordinator_store().current();
    assert_eq!(coordinator.notify_token(NOTIFY_FEISHU), "");
}
