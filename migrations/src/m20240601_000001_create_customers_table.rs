use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240601_000001_create_customers_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Customers::Code).string_len(16).not_null())
                    .col(ColumnDef::new(Customers::Name).string_len(32).not_null())
                    .col(ColumnDef::new(Customers::Note).text().not_null())
                    .col(ColumnDef::new(Customers::AuthorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One code per author; the importer relies on this to detect collisions
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_customers_code_author")
                    .table(Customers::Table)
                    .col(Customers::Code)
                    .col(Customers::AuthorId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Customers {
    Table,
    Id,
    Code,
    Name,
    Note,
    AuthorId,
    CreatedAt,
}
