use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StoredFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StoredFiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StoredFiles::Filename).string().null())
                    .col(ColumnDef::new(StoredFiles::ContentType).string().null())
                    .col(ColumnDef::new(StoredFiles::SizeBytes).big_integer().not_null())
                    .col(
                        ColumnDef::new(StoredFiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FileChunks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FileChunks::FileId).uuid().not_null())
                    .col(ColumnDef::new(FileChunks::Seq).integer().not_null())
                    .col(ColumnDef::new(FileChunks::Data).binary().not_null())
                    .primary_key(
                        Index::create()
                            .col(FileChunks::FileId)
                            .col(FileChunks::Seq),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_file_chunks_file")
                            .from(FileChunks::Table, FileChunks::FileId)
                            .to(StoredFiles::Table, StoredFiles::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FileChunks::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(StoredFiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum StoredFiles {
    Table,
    Id,
    Filename,
    ContentType,
    SizeBytes,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum FileChunks {
    Table,
    FileId,
    Seq,
    Data,
}
