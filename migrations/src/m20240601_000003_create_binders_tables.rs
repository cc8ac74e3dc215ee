use sea_orm_migration::prelude::*;

use super::m20240601_000001_create_customers_table::Customers;
use super::m20240601_000002_create_shelves_tables::Shelves;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240601_000003_create_binders_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Binders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Binders::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Binders::Title).string_len(64).not_null())
                    .col(ColumnDef::new(Binders::CustomerId).uuid().null())
                    .col(ColumnDef::new(Binders::ShelfId).uuid().not_null())
                    .col(ColumnDef::new(Binders::Col).integer().null())
                    .col(ColumnDef::new(Binders::Row).integer().null())
                    .col(ColumnDef::new(Binders::Content).text().not_null())
                    .col(ColumnDef::new(Binders::Color).string_len(6).not_null())
                    .col(ColumnDef::new(Binders::AuthorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Binders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_binders_shelf_id")
                            .from(Binders::Table, Binders::ShelfId)
                            .to(Shelves::Table, Shelves::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_binders_customer_id")
                            .from(Binders::Table, Binders::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one binder per customer
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_binders_customer_id")
                    .table(Binders::Table)
                    .col(Binders::CustomerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_binders_shelf_id")
                    .table(Binders::Table)
                    .col(Binders::ShelfId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BinderAttachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BinderAttachments::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BinderAttachments::BinderId).uuid().not_null())
                    .col(
                        ColumnDef::new(BinderAttachments::Title)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BinderAttachments::File).string().not_null())
                    .col(
                        ColumnDef::new(BinderAttachments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_binder_attachments_binder_id")
                            .from(BinderAttachments::Table, BinderAttachments::BinderId)
                            .to(Binders::Table, Binders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BinderAttachments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Binders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Binders {
    Table,
    Id,
    Title,
    CustomerId,
    ShelfId,
    Col,
    Row,
    Content,
    Color,
    AuthorId,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BinderAttachments {
    Table,
    Id,
    BinderId,
    Title,
    File,
    CreatedAt,
}
