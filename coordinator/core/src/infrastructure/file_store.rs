// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Whole-file storage
//!
//! Configuration documents and named resources are always read and written
//! as complete files. [`FileStore`] is the single seam through which the
//! subsystem touches the filesystem, so tests can count or fail accesses.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;

    /// Replace the file at `path` with `contents`.
    ///
    /// Readers must observe either the old or the new contents, never a
    /// truncated file.
    async fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()>;
}

/// [`FileStore`] over the local filesystem.
///
/// Writes go to a sibling temp file which is then renamed over the target;
/// missing parent directories are created.
#[derive(Debug, Default)]
pub struct LocalFileStore {
    sequence: AtomicU64,
}

impl LocalFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn temp_path(&self, path: &Path) -> PathBuf {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.{}.{}.tmp", file_name, std::process::id(), seq))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.temp_path(path);
        if let Err(e) = tokio::fs::write(&tmp, contents).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/file.txt");
        let store = LocalFileStore::new();

        store.write(&path, b"first").await.unwrap();
        store.write(&path, b"second").await.unwrap();
        assert_eq!(store.read(&path).await.unwrap(), b"second");

        // No temp files are left next to the target
        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFileStore::new()
            .read(&dir.path().join("missing.yml"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
