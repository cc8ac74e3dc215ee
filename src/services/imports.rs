use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use slog::{o, Logger};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::customers::{find_by_code, insert_customer, CustomerInput};
use crate::{
    db::{abandon_transaction, record_transaction},
    entities::upload,
    errors::ServiceError,
    import::{decode, read_customers, CustomerRecord},
};

/// Outcome of a committed import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub upload_id: Uuid,
    pub file_name: String,
    /// Customers inserted by this import
    pub created: u32,
    /// Rows matching a customer the author already had
    pub existing: u32,
}

/// Bulk customer import from CSV uploads.
///
/// An import is all or nothing: rows are written in file order inside one
/// transaction and the first failing row rolls back every earlier one.
#[derive(Clone)]
pub struct ImportService {
    db: Arc<DatabaseConnection>,
    logger: Logger,
    sniff_bytes: usize,
    max_upload_bytes: usize,
}

impl ImportService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        logger: Logger,
        sniff_bytes: usize,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            db,
            logger: logger.new(o!("component" => "imports")),
            sniff_bytes,
            max_upload_bytes,
        }
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn import(
        &self,
        author: Uuid,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ImportReport, ServiceError> {
        if bytes.len() > self.max_upload_bytes {
            return Err(ServiceError::PayloadTooLarge(format!(
                "upload of {} bytes exceeds the {} byte limit",
                bytes.len(),
                self.max_upload_bytes
            )));
        }

        let text = decode(bytes);
        let rows = read_customers(&text, self.sniff_bytes)?;

        let txn = self.db.begin().await?;
        let result = self.import_rows(&txn, author, file_name, rows).await;

        match result {
            Ok(report) => {
                txn.commit().await?;
                record_transaction("import_customers", true);
                metrics::counter!("shelves.import.customers_created", u64::from(report.created));
                slog::info!(self.logger, "customer import committed";
                    "upload_id" => %report.upload_id,
                    "author" => %author,
                    "file_name" => file_name,
                    "created" => report.created,
                    "existing" => report.existing);
                Ok(report)
            }
            Err(err) => {
                let err =
                    abandon_transaction(txn.rollback(), err, "import_customers", &self.logger).await;
                slog::warn!(self.logger, "customer import rolled back";
                    "author" => %author,
                    "file_name" => file_name,
                    "error" => %err);
                Err(err)
            }
        }
    }

    async fn import_rows(
        &self,
        txn: &DatabaseTransaction,
        author: Uuid,
        file_name: &str,
        rows: impl Iterator<Item = Result<CustomerRecord, crate::import::FormatError>>,
    ) -> Result<ImportReport, ServiceError> {
        let mut seen = HashSet::new();
        let mut created = 0u32;
        let mut existing = 0u32;

        for row in rows {
            let record = row?;
            let line = record.line;
            let input = CustomerInput {
                code: record.code,
                name: record.name,
                note: record.note,
            };
            input
                .validate()
                .map_err(|e| ServiceError::ValidationError(format!("line {}: {}", line, e)))?;

            if !seen.insert(input.code.clone()) {
                return Err(ServiceError::DuplicateError(input.code));
            }

            match find_by_code(txn, author, &input.code).await? {
                Some(found) if found.name == input.name && found.note == input.note => {
                    existing += 1;
                }
                Some(_) => return Err(ServiceError::DuplicateError(input.code)),
                None => {
                    insert_customer(txn, author, input).await?;
                    created += 1;
                }
            }
        }

        let upload = upload::ActiveModel {
            id: Set(Uuid::new_v4()),
            author_id: Set(author),
            file_name: Set(file_name.to_string()),
            created_count: Set(created as i32),
            existing_count: Set(existing as i32),
            created_at: Set(Utc::now()),
        }
        .insert(txn)
        .await?;

        Ok(ImportReport {
            upload_id: upload.id,
            file_name: upload.file_name,
            created,
            existing,
        })
    }

    /// Past imports of the author, newest first
    #[instrument(skip(self))]
    pub async fn uploads(&self, author: Uuid) -> Result<Vec<upload::Model>, ServiceError> {
        Ok(upload::Entity::find()
            .filter(upload::Column::AuthorId.eq(author))
            .order_by_desc(upload::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }
}
