use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240601_000002_create_shelves_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shelves::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shelves::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Shelves::Name).string_len(64).not_null())
                    .col(ColumnDef::new(Shelves::Code).string_len(16).not_null())
                    .col(ColumnDef::new(Shelves::Desc).text().not_null())
                    .col(ColumnDef::new(Shelves::Cols).integer().null())
                    .col(ColumnDef::new(Shelves::Rows).integer().null())
                    .col(ColumnDef::new(Shelves::Nums).integer().null())
                    .col(ColumnDef::new(Shelves::AuthorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Shelves::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shelves_code_author")
                    .table(Shelves::Table)
                    .col(Shelves::Code)
                    .col(Shelves::AuthorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Containers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Containers::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Containers::ShelfId).uuid().not_null())
                    .col(ColumnDef::new(Containers::Position).integer().not_null())
                    .col(ColumnDef::new(Containers::Col).integer().null())
                    .col(ColumnDef::new(Containers::Row).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_containers_shelf_id")
                            .from(Containers::Table, Containers::ShelfId)
                            .to(Shelves::Table, Shelves::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_containers_shelf_position")
                    .table(Containers::Table)
                    .col(Containers::ShelfId)
                    .col(Containers::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // NULL coordinates (sequence shelves) never collide in a unique index
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_containers_shelf_coordinate")
                    .table(Containers::Table)
                    .col(Containers::ShelfId)
                    .col(Containers::Col)
                    .col(Containers::Row)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Containers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Shelves::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Shelves {
    Table,
    Id,
    Name,
    Code,
    Desc,
    Cols,
    Rows,
    Nums,
    AuthorId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Containers {
    Table,
    Id,
    ShelfId,
    Position,
    Col,
    Row,
}
