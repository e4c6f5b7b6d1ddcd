// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Named resource files under `<root>/thirdparty`.
//!
//! A token is turned into a path only through the allow-list in
//! [`NamedResource`]. Unknown tokens are rejected before the [`FileStore`] is
//! consulted, so a crafted token can never become an arbitrary path.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::access::{AccessGate, Role, ADMIN_ROLES};
use crate::domain::error::ConfigError;
use crate::domain::named_resource::{is_contained_relative, NamedResource};
use crate::infrastructure::file_store::FileStore;

pub struct ResourceRegistry {
    root: PathBuf,
    files: Arc<dyn FileStore>,
}

impl ResourceRegistry {
    pub fn new(root: impl Into<PathBuf>, files: Arc<dyn FileStore>) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for `token`, or `None` when the token is not allow-listed.
    pub fn resolve(&self, token: &str) -> Option<PathBuf> {
        let resource = NamedResource::from_token(token)?;
        let relative = Path::new(resource.relative_path());
        if !is_contained_relative(relative) {
            return None;
        }
        Some(self.root.join(relative))
    }

    pub async fn read(&self, token: &str) -> Result<Vec<u8>, ConfigError> {
        let path = self.resolve_or_reject(token)?;
        self.files
            .read(&path)
            .await
            .map_err(|e| ConfigError::io(path, e))
    }

    /// Replace the whole resource file. Requires an admin role.
    pub async fn write(&self, role: Role, token: &str, contents: &[u8]) -> Result<PathBuf, ConfigError> {
        AccessGate::require(role, ADMIN_ROLES)?;
        let path = self.resolve_or_reject(token)?;
        self.files
            .write(&path, contents)
            .await
            .map_err(|e| ConfigError::io(&path, e))?;
        info!(token = %token, bytes = contents.len(), "Resource saved");
        Ok(path)
    }

    fn resolve_or_reject(&self, token: &str) -> Result<PathBuf, ConfigError> {
        if token.is_empty() {
            return Err(ConfigError::InvalidInput("resource type not specified".to_string()));
        }
        self.resolve(token).ok_or_else(|| {
            error!(token = %token, "Unknown resource type");
            ConfigError::UnknownResource(token.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::file_store::LocalFileStore;

    fn registry(root: &Path) -> ResourceRegistry {
        ResourceRegistry::new(root, Arc::new(LocalFileStore::new()))
    }

    #[test]
    fn test_resolve_known_token() {
        let registry = registry(Path::new("/opt/scoutline/thirdparty"));
        assert_eq!(
            registry.resolve("black_ip"),
            Some(PathBuf::from("/opt/scoutline/thirdparty/custom/black_ip.txt"))
        );
        assert_eq!(
            registry.resolve("config.xray"),
            Some(PathBuf::from("/opt/scoutline/thirdparty/xray/config.yaml"))
        );
        assert_eq!(registry.resolve("../../etc/passwd"), None);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());

        registry
            .write(Role::Admin, "black_domain", b"example.com\n")
            .await
            .unwrap();
        let content = registry.read("black_domain").await.unwrap();
        assert_eq!(content, b"example.com\n");
        assert!(dir.path().join("custom/black_domain.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_known_resource_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = registry(dir.path()).read("honeypot").await.unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_empty_token_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = registry(dir.path()).read("").await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_guest_cannot_write() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());
        let err = registry
            .write(Role::Guest, "black_ip", b"10.0.0.1")
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Unauthorized { .. }));
        assert!(!dir.path().join("custom/black_ip.txt").exists());
    }
}
