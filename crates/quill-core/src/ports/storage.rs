//! File storage port: staged uploads and the backends that persist them.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An uploaded file spooled to local disk while its request is in flight.
///
/// The staging file is removed when this value drops, so it cannot outlive
/// the store call that consumed it - on success or on failure. A backend that
/// renames the file into place simply leaves nothing for the drop to remove.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    original_filename: String,
    content_type: Option<String>,
}

impl StagedUpload {
    /// Take ownership of a file that has already been spooled to `path`.
    pub fn new(
        path: PathBuf,
        original_filename: impl Into<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            path,
            original_filename: original_filename.into(),
            content_type,
        }
    }

    /// Spool `bytes` into a fresh staging file under `dir`.
    pub fn spool(dir: &Path, original_filename: &str, bytes: &[u8]) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Uuid::new_v4().to_string());
        fs::write(&path, bytes)?;
        Ok(Self::new(path, original_filename, None))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The filename the client supplied for this upload.
    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Extension derived from the original filename's suffix, if it has one.
    /// Propagated so the stored object keeps a usable content-type hint.
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        // Rename-based backends move the file away first; a missing file
        // here is the normal case then.
        let _ = fs::remove_file(&self.path);
    }
}

/// Stable reference to a stored file, in the format of the backend that
/// minted it: `uploads/<name>` (local disk), an absolute URL (remote object
/// store), or `files/<id>` (database blob store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredFileRef(String);

impl StoredFileRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StoredFileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored file's bytes and metadata, as recovered from a byte-holding
/// backend.
#[derive(Debug, Clone)]
pub struct StoredFileData {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Upload backend errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Staging I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Object store rejected the upload: {0}")]
    Remote(String),

    #[error("Blob store failed: {0}")]
    Database(String),
}

/// Durable storage for uploaded files.
///
/// One backend is selected at startup; every reference it mints is opaque to
/// the rest of the system and only meaningful to the backend kind that
/// produced it.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist a staged upload durably and return its stable reference.
    ///
    /// The staging file no longer exists when this returns, whatever the
    /// outcome.
    async fn store(&self, upload: StagedUpload) -> Result<StoredFileRef, StorageError>;

    /// Fetch a stored file's bytes, for backends that hold the bytes
    /// themselves. Backends whose references resolve elsewhere (paths served
    /// statically, public URLs) return `None`.
    async fn load(&self, _id: Uuid) -> Result<Option<StoredFileData>, StorageError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_file_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedUpload::spool(dir.path(), "cover.png", b"png bytes").unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn extension_comes_from_original_filename() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedUpload::spool(dir.path(), "holiday.photo.JPG", b"x").unwrap();
        assert_eq!(staged.extension(), Some("JPG"));

        let bare = StagedUpload::spool(dir.path(), "README", b"x").unwrap();
        assert_eq!(bare.extension(), None);
    }
}
