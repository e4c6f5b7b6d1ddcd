// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration Store
//!
//! Owns the authoritative in-memory copy of one configuration domain and the
//! file it is persisted to.
//!
//! - Readers take an `Arc` snapshot via [`ConfigStore::current`] and never
//!   block on writers for longer than a pointer swap.
//! - Every operation that changes the snapshot or the file holds the
//!   per-domain write lock, so two admins saving different sections cannot
//!   drop each other's changes.
//! - Mutations are applied to a private clone and published by swapping the
//!   snapshot; a reader never sees a half-applied change.
//!
//! [`ConfigStore::update`] is the reload → mutate → write cycle as a single
//! critical section and is what application code should use. `reload`,
//! `mutate` and `write` stay public for simple one-shot tooling.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::document::{ConfigDocument, ConfigDomain};
use crate::domain::error::ConfigError;
use crate::infrastructure::file_store::FileStore;

pub struct ConfigStore<D: ConfigDocument> {
    path: PathBuf,
    files: Arc<dyn FileStore>,
    snapshot: RwLock<Arc<D>>,
    write_lock: Mutex<()>,
}

impl<D: ConfigDocument> ConfigStore<D> {
    /// Store holding the baseline document; nothing is read until
    /// [`ConfigStore::reload`].
    pub fn new(path: impl Into<PathBuf>, files: Arc<dyn FileStore>) -> Self {
        Self {
            path: path.into(),
            files,
            snapshot: RwLock::new(Arc::new(D::default())),
            write_lock: Mutex::new(()),
        }
    }

    /// Store loaded from `path`. A missing file starts from the baseline
    /// document; any other failure is returned.
    pub async fn open(path: impl Into<PathBuf>, files: Arc<dyn FileStore>) -> Result<Self, ConfigError> {
        let store = Self::new(path, files);
        match store.reload().await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                warn!(
                    domain = %D::DOMAIN,
                    path = %store.path.display(),
                    "Configuration file not found, starting from defaults"
                );
            }
            Err(e) => return Err(e),
        }
        Ok(store)
    }

    pub fn domain(&self) -> ConfigDomain {
        D::DOMAIN
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current authoritative snapshot.
    pub fn current(&self) -> Arc<D> {
        self.snapshot.read().clone()
    }

    /// Re-read the document from storage and make it authoritative.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn reload(&self) -> Result<Arc<D>, ConfigError> {
        let _guard = self.write_lock.lock().await;
        let fresh = Arc::new(self.read_document().await?);
        self.install(fresh.clone());
        debug!(domain = %D::DOMAIN, "Configuration reloaded");
        Ok(fresh)
    }

    /// Apply `change` to the in-memory document only.
    ///
    /// Performs no authorization; callers gate it first.
    pub async fn mutate<F>(&self, change: F) -> Result<Arc<D>, ConfigError>
    where
        F: FnOnce(&mut D) -> Result<(), ConfigError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut next = (*self.current()).clone();
        change(&mut next)?;
        let next = Arc::new(next);
        self.install(next.clone());
        Ok(next)
    }

    /// Persist the current snapshot.
    pub async fn write(&self) -> Result<(), ConfigError> {
        let _guard = self.write_lock.lock().await;
        let current = self.current();
        self.persist(&current).await
    }

    /// Reload, apply `change`, validate and write, all under the domain lock.
    ///
    /// The snapshot only advances to the changed document once it is on
    /// disk. If the write fails the snapshot reflects the freshly reloaded
    /// document. A document file that does not exist yet is created from the
    /// current snapshot.
    pub async fn update<F>(&self, change: F) -> Result<Arc<D>, ConfigError>
    where
        F: FnOnce(&mut D) -> Result<(), ConfigError>,
    {
        let _guard = self.write_lock.lock().await;

        let fresh = match self.read_document().await {
            Ok(fresh) => fresh,
            Err(e) if e.is_not_found() => {
                debug!(domain = %D::DOMAIN, "No configuration file yet, updating current snapshot");
                (*self.current()).clone()
            }
            Err(e) => return Err(e),
        };
        let mut next = fresh.clone();
        self.install(Arc::new(fresh));

        change(&mut next)?;
        self.persist(&next).await?;

        let next = Arc::new(next);
        self.install(next.clone());
        info!(domain = %D::DOMAIN, "Configuration updated");
        Ok(next)
    }

    async fn read_document(&self) -> Result<D, ConfigError> {
        let bytes = self
            .files
            .read(&self.path)
            .await
            .map_err(|e| ConfigError::io(&self.path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            ConfigError::io(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        D::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn persist(&self, document: &D) -> Result<(), ConfigError> {
        document.validate()?;
        let yaml = document.to_yaml_string().map_err(ConfigError::Serialize)?;
        self.files
            .write(&self.path, yaml.as_bytes())
            .await
            .map_err(|e| ConfigError::io(&self.path, e))?;
        metrics::counter!("scoutline_config_writes_total", "domain" => D::DOMAIN.to_string())
            .increment(1);
        Ok(())
    }

    fn install(&self, document: Arc<D>) {
        *self.snapshot.write() = document;
    }
}
