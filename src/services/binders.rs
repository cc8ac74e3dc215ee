use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use slog::{o, Logger};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::validation::validate_hex_color;
use crate::{
    db::{abandon_transaction, record_transaction},
    entities::{binder, binder_attachment, customer, shelf},
    errors::ServiceError,
    layout::{validate_placement, Coordinate},
};

/// Fields of a binder, used for creation and full replacement
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BinderInput {
    #[validate(length(min = 1, max = 64))]
    pub title: String,
    pub customer_id: Option<Uuid>,
    pub shelf_id: Uuid,
    pub col: Option<i32>,
    pub row: Option<i32>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    #[validate(custom = "validate_hex_color")]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttachmentInput {
    #[validate(length(min = 1, max = 64))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub file: String,
}

#[derive(Clone)]
pub struct BinderService {
    db: Arc<DatabaseConnection>,
    logger: Logger,
}

impl BinderService {
    pub fn new(db: Arc<DatabaseConnection>, logger: Logger) -> Self {
        Self {
            db,
            logger: logger.new(o!("component" => "binders")),
        }
    }

    #[instrument(skip(self, input), fields(shelf_id = %input.shelf_id))]
    pub async fn create(
        &self,
        author: Uuid,
        input: BinderInput,
    ) -> Result<binder::Model, ServiceError> {
        input.validate()?;
        self.check_references(author, &input, None).await?;

        let customer_id = input.customer_id;
        let binder = binder::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            customer_id: Set(input.customer_id),
            shelf_id: Set(input.shelf_id),
            col: Set(input.col),
            row: Set(input.row),
            content: Set(input.content),
            color: Set(input.color),
            author_id: Set(author),
            updated_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| binder_write_error(e, customer_id))?;

        slog::info!(self.logger, "binder created";
            "binder_id" => %binder.id, "shelf_id" => %binder.shelf_id, "author" => %author);
        Ok(binder)
    }

    /// Lists the author's binders, optionally only those on one shelf
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        author: Uuid,
        shelf_id: Option<Uuid>,
    ) -> Result<Vec<binder::Model>, ServiceError> {
        let mut query = binder::Entity::find().filter(binder::Column::AuthorId.eq(author));
        if let Some(shelf_id) = shelf_id {
            query = query.filter(binder::Column::ShelfId.eq(shelf_id));
        }
        Ok(query
            .order_by_asc(binder::Column::Title)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, author: Uuid, id: Uuid) -> Result<binder::Model, ServiceError> {
        binder::Entity::find_by_id(id)
            .filter(binder::Column::AuthorId.eq(author))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Binder {} not found", id)))
    }

    /// Replaces every field of the binder, placement checked again.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        author: Uuid,
        id: Uuid,
        input: BinderInput,
    ) -> Result<binder::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(author, id).await?;
        self.check_references(author, &input, Some(id)).await?;

        let customer_id = input.customer_id;
        let mut active: binder::ActiveModel = existing.into();
        active.title = Set(input.title);
        active.customer_id = Set(input.customer_id);
        active.shelf_id = Set(input.shelf_id);
        active.col = Set(input.col);
        active.row = Set(input.row);
        active.content = Set(input.content);
        active.color = Set(input.color);
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&*self.db)
            .await
            .map_err(|e| binder_write_error(e, customer_id))?;

        slog::info!(self.logger, "binder updated"; "binder_id" => %id);
        Ok(updated)
    }

    /// Deletes the binder and its attachments.
    #[instrument(skip(self))]
    pub async fn delete(&self, author: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let binder = self.get(author, id).await?;

        let txn = self.db.begin().await?;
        let result = async {
            binder_attachment::Entity::delete_many()
                .filter(binder_attachment::Column::BinderId.eq(binder.id))
                .exec(&txn)
                .await?;
            binder::Entity::delete_by_id(binder.id).exec(&txn).await?;
            Ok::<_, ServiceError>(())
        }
        .await;

        match result {
            Ok(()) => {
                txn.commit().await?;
                record_transaction("delete_binder", true);
                slog::info!(self.logger, "binder deleted"; "binder_id" => %id);
                Ok(())
            }
            Err(err) => {
                let err =
                    abandon_transaction(txn.rollback(), err, "delete_binder", &self.logger).await;
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn attachments(
        &self,
        author: Uuid,
        binder_id: Uuid,
    ) -> Result<Vec<binder_attachment::Model>, ServiceError> {
        let binder = self.get(author, binder_id).await?;
        Ok(binder_attachment::Entity::find()
            .filter(binder_attachment::Column::BinderId.eq(binder.id))
            .order_by_asc(binder_attachment::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, input))]
    pub async fn add_attachment(
        &self,
        author: Uuid,
        binder_id: Uuid,
        input: AttachmentInput,
    ) -> Result<binder_attachment::Model, ServiceError> {
        input.validate()?;
        let binder = self.get(author, binder_id).await?;

        let attachment = binder_attachment::ActiveModel {
            id: Set(Uuid::new_v4()),
            binder_id: Set(binder.id),
            title: Set(input.title),
            file: Set(input.file),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        slog::info!(self.logger, "attachment added";
            "binder_id" => %binder.id, "attachment_id" => %attachment.id);
        Ok(attachment)
    }

    #[instrument(skip(self))]
    pub async fn remove_attachment(
        &self,
        author: Uuid,
        binder_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<(), ServiceError> {
        let binder = self.get(author, binder_id).await?;

        let deleted = binder_attachment::Entity::delete_many()
            .filter(binder_attachment::Column::Id.eq(attachment_id))
            .filter(binder_attachment::Column::BinderId.eq(binder.id))
            .exec(&*self.db)
            .await?;

        if deleted.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Attachment {} not found",
                attachment_id
            )));
        }
        Ok(())
    }

    /// Resolves the shelf and customer the binder points at and validates
    /// its placement. `current` is the binder being replaced, if any.
    async fn check_references(
        &self,
        author: Uuid,
        input: &BinderInput,
        current: Option<Uuid>,
    ) -> Result<Option<Coordinate>, ServiceError> {
        let shelf = shelf::Entity::find_by_id(input.shelf_id)
            .filter(shelf::Column::AuthorId.eq(author))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Shelf {} not found", input.shelf_id)))?;

        if let Some(customer_id) = input.customer_id {
            customer::Entity::find_by_id(customer_id)
                .filter(customer::Column::AuthorId.eq(author))
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Customer {} not found", customer_id))
                })?;
        }

        let coordinate = validate_placement(shelf.layout()?, input.col, input.row)?;

        if let Some(coordinate) = coordinate {
            let mut occupants = binder::Entity::find()
                .filter(binder::Column::ShelfId.eq(shelf.id))
                .filter(binder::Column::Col.eq(coordinate.col as i32))
                .filter(binder::Column::Row.eq(coordinate.row as i32));
            if let Some(current) = current {
                occupants = occupants.filter(binder::Column::Id.ne(current));
            }
            let occupied = occupants.count(&*self.db).await?;
            if occupied > 0 {
                slog::warn!(self.logger, "coordinate already occupied";
                    "shelf_id" => %shelf.id,
                    "col" => coordinate.col,
                    "row" => coordinate.row,
                    "occupants" => occupied);
            }
        }

        Ok(coordinate)
    }
}

fn binder_write_error(err: sea_orm::DbErr, customer_id: Option<Uuid>) -> ServiceError {
    let key = match customer_id {
        Some(id) => format!("customer {} already has a binder", id),
        None => "binder".to_string(),
    };
    ServiceError::on_write(err, key)
}
