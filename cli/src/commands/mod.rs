// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Scoutline CLI

pub mod config;
pub mod poc;
pub mod probe;
pub mod resource;
pub mod set;
pub mod view;

pub use self::config::ConfigCommand;
pub use self::poc::PocCommand;
pub use self::resource::ResourceCommand;
pub use self::set::SetCommand;
pub use self::view::ViewCommand;

use anyhow::{Context, Result};
use std::path::PathBuf;

use scoutline_core::application::config_service::ConfigService;
use scoutline_core::domain::settings::Settings;

/// Load and validate settings, then open both configuration documents.
pub async fn load_service(config_override: Option<PathBuf>) -> Result<ConfigService> {
    let settings = Settings::load_or_default(config_override).context("Failed to load settings")?;
    settings.validate().context("Settings validation failed")?;
    ConfigService::from_settings(&settings)
        .await
        .context("Failed to open configuration documents")
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};

    /// Settings file rooted in `root`, with no probe endpoints.
    pub fn write_settings(root: &Path) -> PathBuf {
        let path = root.join("scoutline.yaml");
        std::fs::write(&path, format!("root_path: {}\n", root.display())).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_service_from_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let settings = test_support::write_settings(dir.path());

        let service = load_service(Some(settings)).await.unwrap();
        assert_eq!(
            service.agent_store().path(),
            dir.path().join("conf/worker.yml")
        );
        assert_eq!(service.resources().root(), dir.path().join("thirdparty"));
    }

    #[tokio::test]
    async fn test_load_service_missing_explicit_settings() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_service(Some(dir.path().join("missing.yaml"))).await.is_err());
    }
}
