//! Migration framework
//!
//! Provides:
//! - One embedded migration set per database
//! - Migration runner with checksums
//! - Idempotent application

mod checksums;
mod embedded;
mod runner;

pub use embedded::{Migration, MigrationSet};
pub use runner::{applied_migrations, apply_migrations};
