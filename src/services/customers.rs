use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use slog::{o, Logger};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::validation::validate_slug;
use crate::{
    db::{abandon_transaction, record_transaction},
    entities::{binder, binder_attachment, customer},
    errors::ServiceError,
};

/// Fields of a customer, used for creation and full replacement
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 16), custom = "validate_slug")]
    pub code: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub note: String,
}

/// Customer records owned by an author
#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DatabaseConnection>,
    logger: Logger,
}

impl CustomerService {
    pub fn new(db: Arc<DatabaseConnection>, logger: Logger) -> Self {
        Self {
            db,
            logger: logger.new(o!("component" => "customers")),
        }
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(
        &self,
        author: Uuid,
        input: CustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;

        let customer = insert_customer(&*self.db, author, input).await?;

        slog::info!(self.logger, "customer created";
            "customer_id" => %customer.id, "code" => &customer.code, "author" => %author);
        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, author: Uuid) -> Result<Vec<customer::Model>, ServiceError> {
        Ok(customer::Entity::find()
            .filter(customer::Column::AuthorId.eq(author))
            .order_by_asc(customer::Column::Code)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, author: Uuid, id: Uuid) -> Result<customer::Model, ServiceError> {
        customer::Entity::find_by_id(id)
            .filter(customer::Column::AuthorId.eq(author))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn get_by_code(
        &self,
        author: Uuid,
        code: &str,
    ) -> Result<customer::Model, ServiceError> {
        find_by_code(&*self.db, author, code)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer with code {} not found", code)))
    }

    /// Replaces every field of the customer
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        author: Uuid,
        id: Uuid,
        input: CustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(author, id).await?;

        let code = input.code.clone();
        let mut active: customer::ActiveModel = existing.into();
        active.code = Set(input.code);
        active.name = Set(input.name);
        active.note = Set(input.note);

        let updated = active
            .update(&*self.db)
            .await
            .map_err(|e| ServiceError::on_write(e, code))?;

        slog::info!(self.logger, "customer updated"; "customer_id" => %id);
        Ok(updated)
    }

    /// Deletes the customer together with its binder and the binder's
    /// attachments.
    #[instrument(skip(self))]
    pub async fn delete(&self, author: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let customer = self.get(author, id).await?;

        let txn = self.db.begin().await?;
        let result = async {
            let binder_ids: Vec<Uuid> = binder::Entity::find()
                .filter(binder::Column::CustomerId.eq(customer.id))
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

            customer::Entity::delete_by_id(customer.id).exec(&txn).await?;
            Ok::<_, ServiceError>(())
        }
        .await;

        match result {
            Ok(()) => {
                txn.commit().await?;
                record_transaction("delete_customer", true);
                slog::info!(self.logger, "customer deleted"; "customer_id" => %id);
                Ok(())
            }
            Err(err) => {
                let err =
                    abandon_transaction(txn.rollback(), err, "delete_customer", &self.logger).await;
                Err(err)
            }
        }
    }
}

/// Looks up an author's customer by code
pub(crate) async fn find_by_code<C: ConnectionTrait>(
    conn: &C,
    author: Uuid,
    code: &str,
) -> Result<Option<customer::Model>, ServiceError> {
    Ok(customer::Entity::find()
        .filter(customer::Column::AuthorId.eq(author))
        .filter(customer::Column::Code.eq(code))
        .one(conn)
        .await?)
}

/// Inserts a validated customer; a taken (code, author) pair becomes a
/// duplicate error carrying the code.
pub(crate) async fn insert_customer<C: ConnectionTrait>(
    conn: &C,
    author: Uuid,
    input: CustomerInput,
) -> Result<customer::Model, ServiceError> {
    let code = input.code.clone();
    customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(input.code),
        name: Set(input.name),
        note: Set(input.note),
        author_id: Set(author),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await
    .map_err(|e| ServiceError::on_write(e, code))
}
