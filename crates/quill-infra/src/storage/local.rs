//! Local-disk storage backend.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use quill_core::ports::{FileStore, StagedUpload, StorageError, StoredFileRef};

use super::object_name;

/// Stores uploads under a single directory on the local filesystem, served
/// back through the static `/uploads` mount.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, upload: StagedUpload) -> Result<StoredFileRef, StorageError> {
        fs::create_dir_all(&self.root).await?;

        let name = object_name(&upload);
        let dest = self.root.join(&name);

        // Staging and uploads usually share a filesystem; fall back to a
        // copy when they don't.
        if fs::rename(upload.path(), &dest).await.is_err() {
            fs::copy(upload.path(), &dest).await?;
        }

        Ok(StoredFileRef::new(format!("uploads/{name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_moves_staging_into_root() {
        let staging = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();

        let upload = StagedUpload::spool(staging.path(), "cover.png", b"png bytes").unwrap();
        let staged_path = upload.path().to_path_buf();

        let store = LocalFileStore::new(root.path().to_path_buf());
        let stored = store.store(upload).await.unwrap();

        let name = stored.as_str().strip_prefix("uploads/").unwrap();
        assert!(name.ends_with(".png"));
        assert_eq!(std::fs::read(root.path().join(name)).unwrap(), b"png bytes");
        assert!(!staged_path.exists());
    }

    #[tokio::test]
    async fn test_store_failure_still_cleans_staging() {
        let staging = tempfile::tempdir().unwrap();
        // A root path that is actually a file, so create_dir_all fails.
        let blocker = tempfile::NamedTempFile::new().unwrap();

        let upload = StagedUpload::spool(staging.path(), "cover.png", b"x").unwrap();
        let staged_path = upload.path().to_path_buf();

        let store = LocalFileStore::new(blocker.path().to_path_buf());
        assert!(store.store(upload).await.is_err());
        assert!(!staged_path.exists());
    }
}
