//! Document storage: opaque PDF bytes keyed by a generated id.

#[cfg(test)]
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Mutex;

use tempfile::NamedTempFile;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("PDF with id {0} not found")]
    NotFound(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A key-value store for document bytes.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under a fresh id and return it.
    fn put(&self, bytes: &[u8]) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.put_with_id(&id, bytes)?;
        Ok(id)
    }

    /// Store `bytes` under `id`, overwriting what was there.
    fn put_with_id(&self, id: &str, bytes: &[u8]) -> Result<(), StoreError>;

    fn get(&self, id: &str) -> Result<Vec<u8>, StoreError>;
}

/// Stores each document as `<dir>/<id>.pdf`.
///
/// Ids must be UUIDs; anything else is reported as not found and never
/// reaches the filesystem.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    dir: PathBuf,
}

impl FsBlobStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, id: &str) -> Result<PathBuf, StoreError> {
        let uuid = Uuid::parse_str(id).map_err(|_| StoreError::NotFound(id.to_string()))?;
        Ok(self.dir.join(format!("{uuid}.pdf")))
    }
}

impl BlobStore for FsBlobStore {
    fn put_with_id(&self, id: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path(id)?;
        // Readers see either the old document or the new one, never a partial write.
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(bytes)?;
        file.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        log::debug!("stored {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path(id)?;
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(id.to_string()),
            _ => StoreError::Io(e),
        })
    }
}

/// In-memory store for handler tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

#[cfg(test)]
impl BlobStore for MemoryBlobStore {
    fn put_with_id(&self, id: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.insert(id.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
