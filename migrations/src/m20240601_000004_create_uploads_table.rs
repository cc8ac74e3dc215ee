use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240601_000004_create_uploads_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Uploads::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Uploads::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Uploads::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Uploads::FileName).string().not_null())
                    .col(ColumnDef::new(Uploads::CreatedCount).integer().not_null())
                    .col(ColumnDef::new(Uploads::ExistingCount).integer().not_null())
                    .col(
                        ColumnDef::new(Uploads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Uploads::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Uploads {
    Table,
    Id,
    AuthorId,
    FileName,
    CreatedCount,
    ExistingCount,
    CreatedAt,
}
