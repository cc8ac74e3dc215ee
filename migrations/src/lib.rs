pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_customers_table;
mod m20240601_000002_create_shelves_tables;
mod m20240601_000003_create_binders_tables;
mod m20240601_000004_create_uploads_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_customers_table::Migration),
            Box::new(m20240601_000002_create_shelves_tables::Migration),
            Box::new(m20240601_000003_create_binders_tables::Migration),
            Box::new(m20240601_000004_create_uploads_table::Migration),
        ]
    }
}
