//! Upload storage backends.

mod database;
mod local;
mod remote;

pub use database::DbFileStore;
pub use local::LocalFileStore;
pub use remote::{RemoteFileStore, RemoteStorageConfig};

use quill_core::ports::StagedUpload;
use uuid::Uuid;

/// Mint a collision-free object name, keeping the upload's extension so the
/// stored object stays recognizable to browsers.
fn object_name(upload: &StagedUpload) -> String {
    let id = Uuid::new_v4();
    match upload.extension() {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let upload = StagedUpload::spool(dir.path(), "cover.png", b"x").unwrap();

        let name = object_name(&upload);
        assert!(name.ends_with(".png"));

        let stem = name.strip_suffix(".png").unwrap();
        assert!(Uuid::parse_str(stem).is_ok());
    }

    #[test]
    fn test_object_name_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let upload = StagedUpload::spool(dir.path(), "README", b"x").unwrap();

        assert!(Uuid::parse_str(&object_name(&upload)).is_ok());
    }
}
