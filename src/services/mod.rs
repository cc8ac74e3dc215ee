pub mod binders;
pub mod customers;
pub mod imports;
pub mod shelves;
pub mod validation;

pub use binders::{AttachmentInput, BinderInput, BinderService};
pub use customers::{CustomerInput, CustomerService};
pub use imports::{ImportReport, ImportService};
pub use shelves::{
    ContainerDetail, CreateShelfInput, ShelfDetail, ShelfService, ShelfWithContainers,
    UpdateShelfInput,
};
