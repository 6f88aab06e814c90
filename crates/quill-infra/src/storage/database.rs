//! Database storage backend.
//!
//! File bytes live in the primary database, chunked into rows so no single
//! row or query payload grows unbounded. References look like `files/<id>`
//! and resolve through the file-serving endpoint.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use quill_core::ports::{FileStore, StagedUpload, StorageError, StoredFileData, StoredFileRef};

use crate::database::entity::{file_chunk, stored_file};

const CHUNK_BYTES: usize = 256 * 1024;

/// Stores upload bytes in `stored_files` + `file_chunks` rows.
pub struct DbFileStore {
    db: DbConn,
}

impl DbFileStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn db_err(e: DbErr) -> StorageError {
    StorageError::Database(e.to_string())
}

fn chunk_models(file_id: Uuid, bytes: &[u8]) -> Vec<file_chunk::ActiveModel> {
    bytes
        .chunks(CHUNK_BYTES)
        .enumerate()
        .map(|(seq, data)| file_chunk::ActiveModel {
            file_id: Set(file_id),
            seq: Set(seq as i32),
            data: Set(data.to_vec()),
        })
        .collect()
}

#[async_trait]
impl FileStore for DbFileStore {
    async fn store(&self, upload: StagedUpload) -> Result<StoredFileRef, StorageError> {
        let bytes = tokio::fs::read(upload.path()).await?;
        let id = Uuid::new_v4();

        let metadata = stored_file::ActiveModel {
            id: Set(id),
            filename: Set(Some(upload.original_filename().to_owned())),
            content_type: Set(upload.content_type().map(ToOwned::to_owned)),
            size_bytes: Set(bytes.len() as i64),
            created_at: Set(Utc::now().into()),
        };
        let chunks = chunk_models(id, &bytes);

        // Metadata and chunks commit in one transaction.
        let txn = self.db.begin().await.map_err(db_err)?;
        stored_file::Entity::insert(metadata)
            .exec_without_returning(&txn)
            .await
            .map_err(db_err)?;
        if !chunks.is_empty() {
            file_chunk::Entity::insert_many(chunks)
                .exec_without_returning(&txn)
                .await
                .map_err(db_err)?;
        }
        txn.commit().await.map_err(db_err)?;

        Ok(StoredFileRef::new(format!("files/{id}")))
    }

    async fn load(&self, id: Uuid) -> Result<Option<StoredFileData>, StorageError> {
        let Some(meta) = stored_file::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let chunks = file_chunk::Entity::find()
            .filter(file_chunk::Column::FileId.eq(id))
            .order_by_asc(file_chunk::Column::Seq)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut bytes = Vec::with_capacity(meta.size_bytes as usize);
        for chunk in chunks {
            bytes.extend_from_slice(&chunk.data);
        }

        Ok(Some(StoredFileData {
            filename: meta.filename,
            content_type: meta.content_type,
            bytes,
        }))
    }
}
