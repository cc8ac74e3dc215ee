use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use slog::{o, Logger};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::validation::validate_slug;
use crate::{
    db::{abandon_transaction, record_transaction},
    entities::{binder, binder_attachment, container, shelf},
    errors::ServiceError,
    layout::{allocate, ContainerSlot, ShelfLayout},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShelfInput {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(min = 1, max = 16), custom = "validate_slug")]
    pub code: String,
    #[serde(default)]
    pub desc: String,
    pub cols: Option<i32>,
    pub rows: Option<i32>,
    pub nums: Option<i32>,
}

/// Replacement of a shelf's descriptive fields. Dimensions may be repeated
/// but not changed once containers are allocated.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateShelfInput {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(min = 1, max = 16), custom = "validate_slug")]
    pub code: String,
    #[serde(default)]
    pub desc: String,
    pub cols: Option<i32>,
    pub rows: Option<i32>,
    pub nums: Option<i32>,
}

/// A freshly created shelf with its allocated containers
#[derive(Debug, Clone, Serialize)]
pub struct ShelfWithContainers {
    #[serde(flatten)]
    pub shelf: shelf::Model,
    pub containers: Vec<container::Model>,
}

/// A container with the binders placed on its coordinate
#[derive(Debug, Clone, Serialize)]
pub struct ContainerDetail {
    #[serde(flatten)]
    pub container: container::Model,
    pub binders: Vec<binder::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShelfDetail {
    #[serde(flatten)]
    pub shelf: shelf::Model,
    pub layout: ShelfLayout,
    pub containers: Vec<ContainerDetail>,
    /// Binders on the shelf without a coordinate
    pub unplaced: Vec<binder::Model>,
}

#[derive(Clone)]
pub struct ShelfService {
    db: Arc<DatabaseConnection>,
    logger: Logger,
    max_cells: u32,
}

impl ShelfService {
    pub fn new(db: Arc<DatabaseConnection>, logger: Logger, max_cells: u32) -> Self {
        Self {
            db,
            logger: logger.new(o!("component" => "shelves")),
            max_cells,
        }
    }

    /// Creates a shelf and allocates its containers in one transaction.
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(
        &self,
        author: Uuid,
        input: CreateShelfInput,
    ) -> Result<ShelfWithContainers, ServiceError> {
        input.validate()?;

        let layout = ShelfLayout::from_dimensions(input.cols, input.rows, input.nums)?;
        let slots = allocate(layout, self.max_cells)?;

        let shelf_id = Uuid::new_v4();
        let code = input.code.clone();
        let shelf = shelf::ActiveModel {
            id: Set(shelf_id),
            name: Set(input.name),
            code: Set(input.code),
            desc: Set(input.desc),
            cols: Set(input.cols),
            rows: Set(input.rows),
            nums: Set(input.nums),
            author_id: Set(author),
            created_at: Set(Utc::now()),
        };
        let containers: Vec<container::ActiveModel> = slots
            .iter()
            .map(|slot| container_row(shelf_id, slot))
            .collect();

        let txn = self.db.begin().await?;
        let result = async {
            let shelf = shelf
                .insert(&txn)
                .await
                .map_err(|e| ServiceError::on_write(e, code))?;
            container::Entity::insert_many(containers)
                .exec_without_returning(&txn)
                .await?;
            let containers = container::Entity::find()
                .filter(container::Column::ShelfId.eq(shelf_id))
                .order_by_asc(container::Column::Position)
                .all(&txn)
                .await?;
            Ok::<_, ServiceError>(ShelfWithContainers { shelf, containers })
        }
        .await;

        match result {
            Ok(created) => {
                txn.commit().await?;
                record_transaction("create_shelf", true);
                metrics::counter!("shelves.containers_allocated", created.containers.len() as u64);
                slog::info!(self.logger, "shelf created";
                    "shelf_id" => %shelf_id,
                    "author" => %author,
                    "containers" => created.containers.len());
                Ok(created)
            }
            Err(err) => {
                let err =
                    abandon_transaction(txn.rollback(), err, "create_shelf", &self.logger).await;
                slog::warn!(self.logger, "shelf creation rolled back"; "error" => %err);
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, author: Uuid) -> Result<Vec<shelf::Model>, ServiceError> {
        Ok(shelf::Entity::find()
            .filter(shelf::Column::AuthorId.eq(author))
            .order_by_asc(shelf::Column::Code)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, author: Uuid, id: Uuid) -> Result<shelf::Model, ServiceError> {
        shelf::Entity::find_by_id(id)
            .filter(shelf::Column::AuthorId.eq(author))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Shelf {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn containers(
        &self,
        author: Uuid,
        id: Uuid,
    ) -> Result<Vec<container::Model>, ServiceError> {
        let shelf = self.get(author, id).await?;
        Ok(container::Entity::find()
            .filter(container::Column::ShelfId.eq(shelf.id))
            .order_by_asc(container::Column::Position)
            .all(&*self.db)
            .await?)
    }

    /// The shelf with its containers and the binders placed on each.
    #[instrument(skip(self))]
    pub async fn detail(&self, author: Uuid, id: Uuid) -> Result<ShelfDetail, ServiceError> {
        let shelf = self.get(author, id).await?;
        let layout = shelf.layout()?;

        let containers = container::Entity::find()
            .filter(container::Column::ShelfId.eq(shelf.id))
            .order_by_asc(container::Column::Position)
            .all(&*self.db)
            .await?;
        let binders = binder::Entity::find()
            .filter(binder::Column::ShelfId.eq(shelf.id))
            .order_by_asc(binder::Column::Title)
            .all(&*self.db)
            .await?;

        let mut placed: HashMap<(i32, i32), Vec<binder::Model>> = HashMap::new();
        let mut unplaced = Vec::new();
        for binder in binders {
            match (binder.col, binder.row) {
                (Some(col), Some(row)) => placed.entry((col, row)).or_default().push(binder),
                _ => unplaced.push(binder),
            }
        }

        let containers = containers
            .into_iter()
            .map(|container| {
                let binders = match (container.col, container.row) {
                    (Some(col), Some(row)) => placed.remove(&(col, row)).unwrap_or_default(),
                    _ => Vec::new(),
                };
                ContainerDetail { container, binders }
            })
            .collect();

        Ok(ShelfDetail {
            shelf,
            layout,
            containers,
            unplaced,
        })
    }

    /// Replaces name, code and description. The layout is fixed once the
    /// containers exist.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        author: Uuid,
        id: Uuid,
        input: UpdateShelfInput,
    ) -> Result<shelf::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(author, id).await?;

        let requested = (input.cols, input.rows, input.nums);
        let unchanged = requested == (None, None, None)
            || requested == (existing.cols, existing.rows, existing.nums);
        if !unchanged {
            return Err(ServiceError::ConfigurationError(
                "shelf layout cannot change once containers are allocated".to_string(),
            ));
        }

        let code = input.code.clone();
        let mut active: shelf::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.code = Set(input.code);
        active.desc = Set(input.desc);

        let updated = active
            .update(&*self.db)
            .await
            .map_err(|e| ServiceError::on_write(e, code))?;

        slog::info!(self.logger, "shelf updated"; "shelf_id" => %id);
        Ok(updated)
    }

    /// Deletes the shelf, its containers, its binders and their attachments.
    #[instrument(skip(self))]
    pub async fn delete(&self, author: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let shelf = self.get(author, id).await?;

        let txn = self.db.begin().await?;
        let result = async {
            let binder_ids: Vec<Uuid> = binder::Entity::find()
                .filter(binder::Column::ShelfId.eq(shelf.id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|b| b.id)
                .collect();

            if !binder_ids.is_empty() {
                binder_attachment::Entity::delete_many()
                    .filter(binder_attachment::Column::BinderId.is_in(binder_ids.clone()))
                    .exec(&txn)
                    .await?;
                binder::Entity::delete_many()
                    .filter(binder::Column::Id.is_in(binder_ids))
                    .exec(&txn)
                    .await?;
            }

            container::Entity::delete_many()
                .filter(container::Column::ShelfId.eq(shelf.id))
                .exec(&txn)
                .await?;
            shelf::Entity::delete_by_id(shelf.id).exec(&txn).await?;
            Ok::<_, ServiceError>(())
        }
        .await;

        match result {
            Ok(()) => {
                txn.commit().await?;
                record_transaction("delete_shelf", true);
                slog::info!(self.logger, "shelf deleted"; "shelf_id" => %id);
                Ok(())
            }
            Err(err) => {
                let err =
                    abandon_transaction(txn.rollback(), err, "delete_shelf", &self.logger).await;
                Err(err)
            }
        }
    }
}

fn container_row(shelf_id: Uuid, slot: &ContainerSlot) -> container::ActiveModel {
    // slot values are bounded by the configured shelf capacity
    container::ActiveModel {
        id: Set(Uuid::new_v4()),
        shelf_id: Set(shelf_id),
        position: Set(slot.position as i32),
        col: Set(slot.col.map(|c| c as i32)),
        row: Set(slot.row.map(|r| r as i32)),
    }
}
