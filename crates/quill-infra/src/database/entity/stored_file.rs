//! Stored file metadata entity for the database storage backend.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "stored_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::file_chunk::Entity")]
    FileChunk,
}

impl Related<super::file_chunk::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileChunk.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
