//! HQ warehouse store - SQLite persistence for staging and warehouse
//!
//! Provides:
//! - Connection setup and per-database migrations with checksums
//! - `StagingRepository` over the `staging_rows` table
//! - `WarehouseRepository` over the currency, forex and offer tables
//! - `CheckoutStore` over both, with the warehouse attached to the staging
//!   connection

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use errors::Result;
pub use repo::{SqliteCheckoutStore, SqliteStagingRepo, SqliteWarehouseRepo, WarehouseEntry};
