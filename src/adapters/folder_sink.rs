use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::OutputUnit;
use crate::error::{GridcastError, Result};
use crate::traits::ContentSink;

const FILE_PREFIX: &str = "UNSENT_MESSAGE";

/// Drops every unit as a text file into each outbox folder.
///
/// A downstream sender picks the files up; duplicates are tolerated.
pub struct FolderSink {
    folders: Vec<PathBuf>,
}

impl FolderSink {
    pub fn new(folders: Vec<PathBuf>) -> Self {
        Self { folders }
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    async fn write_into(folder: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
        // Folder may have been removed since the last write
        tokio::fs::create_dir_all(folder).await?;
        let path = folder.join(name);
        tokio::fs::write(&path, body).await?;
        Ok(path)
    }
}

#[async_trait]
impl ContentSink for FolderSink {
    async fn deliver(&self, unit: &OutputUnit) -> Result<()> {
        if self.folders.is_empty() {
            return Err(GridcastError::Sink("no outbox folders configured".to_string()));
        }

        let name = format!("{}{}.txt", FILE_PREFIX, Uuid::new_v4());
        let body = unit.render();
        let mut failed = Vec::new();

        for folder in &self.folders {
            match Self::write_into(folder, &name, &body).await {
                Ok(path) => debug!(path = %path.display(), "unit written"),
                Err(e) => {
                    warn!(folder = %folder.display(), error = %e, "outbox write failed");
                    failed.push(format!("{}: {}", folder.display(), e));
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(GridcastError::Sink(failed.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn files_in(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    #[tokio::test]
    async fn test_writes_to_every_folder() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("a");
        let b = root.path().join("nested/b");
        let sink = FolderSink::new(vec![a.clone(), b.clone()]);

        sink.deliver(&OutputUnit::pair("WAS 7 vs SF 0", "1st & 10"))
            .await
            .unwrap();

        for folder in [&a, &b] {
            let files = files_in(folder);
            assert_eq!(files.len(), 1);
            let name = files[0].file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("UNSENT_MESSAGE"));
            assert!(name.ends_with(".txt"));
            assert_eq!(
                std::fs::read_to_string(&files[0]).unwrap(),
                "WAS 7 vs SF 0\n1st & 10"
            );
        }
    }

    #[tokio::test]
    async fn test_recreates_removed_folder() {
        let root = TempDir::new().unwrap();
        let outbox = root.path().join("outbox");
        let sink = FolderSink::new(vec![outbox.clone()]);

        sink.deliver(&OutputUnit::single("one")).await.unwrap();
        std::fs::remove_dir_all(&outbox).unwrap();
        sink.deliver(&OutputUnit::single("two")).await.unwrap();

        assert_eq!(files_in(&outbox).len(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported() {
        let root = TempDir::new().unwrap();
        let good = root.path().join("good");
        // A regular file where a folder is expected
        let blocked = root.path().join("blocked");
        std::fs::write(&blocked, "x").unwrap();

        let sink = FolderSink::new(vec![good.clone(), blocked]);
        let err = sink.deliver(&OutputUnit::single("hello")).await.unwrap_err();

        assert!(matches!(err, GridcastError::Sink(_)));
        assert_eq!(files_in(&good).len(), 1);
    }

    #[tokio::test]
    async fn test_no_folders() {
        let sink = FolderSink::new(Vec::new());
        assert!(sink.deliver(&OutputUnit::single("x")).await.is_err());
    }
}
