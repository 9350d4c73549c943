//! Repository layer implementing the core storage traits on SQLite

pub mod checkout_store;
pub mod staging_repo;
pub mod warehouse_repo;

pub use checkout_store::SqliteCheckoutStore;
pub use staging_repo::SqliteStagingRepo;
pub use warehouse_repo::{SqliteWarehouseRepo, WarehouseEntry};
