pub mod binders;
pub mod common;
pub mod customers;
pub mod shelves;
pub mod uploads;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{BinderService, CustomerService, ImportService, ShelfService},
};
use slog::Logger;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<CustomerService>,
    pub shelves: Arc<ShelfService>,
    pub binders: Arc<BinderService>,
    pub imports: Arc<ImportService>,
}

impl AppServices {
    /// Builds every service over one pool and one root logger.
    pub fn new(db_pool: Arc<DbPool>, logger: &Logger, config: &AppConfig) -> Self {
        Self {
            customers: Arc::new(CustomerService::new(db_pool.clone(), logger.clone())),
            shelves: Arc::new(ShelfService::new(
                db_pool.clone(),
                logger.clone(),
                config.max_shelf_cells,
            )),
            binders: Arc::new(BinderService::new(db_pool.clone(), logger.clone())),
            imports: Arc::new(ImportService::new(
                db_pool,
                logger.clone(),
                config.import_sniff_bytes,
                config.max_upload_bytes,
            )),
        }
    }
}
