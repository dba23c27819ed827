use crate::error::Result;
use async_trait::async_trait;
use log::{info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Durable home of the ledger snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<Vec<u8>>>;
    async fn save(&self, snapshot: &[u8]) -> Result<()>;
}

/// Keeps the snapshot in a single JSON file, rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                info!("Loaded snapshot from {:?} ({} bytes)", self.path, bytes.len());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Snapshot file {:?} not found, starting with an empty ledger", self.path);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, snapshot: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        // A crash mid-write leaves the previous snapshot in place.
        let temp = self.temp_path();
        tokio::fs::write(&temp, snapshot).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}
