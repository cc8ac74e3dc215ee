pub mod binder;
pub mod binder_attachment;
pub mod container;
pub mod customer;
pub mod shelf;
pub mod upload;
