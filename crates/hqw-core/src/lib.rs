//! HQ warehouse core
//!
//! Domain model and rules of the staging-to-warehouse checkout:
//! - Staged rows, their status lifecycle and the warehouse records they become
//! - Deterministic per-table validation producing valid, questionable or
//!   invalid verdicts
//! - Repository traits for the staging area and the warehouse, with
//!   in-memory implementations
//! - Error and logging facilities shared by the other crates

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod repository;
pub mod rules;

pub use errors::{HqError, HqErrorKind, Result, WarehouseError};
pub use model::{
    BatchNumber, CheckoutOutcome, CheckoutReport, Decision, RawFields, RowId, RowStatus,
    RunSummary, StagingRow, TableName, WarehouseRecord,
};
pub use repository::{StagingRepository, WarehouseRepository};
pub use rules::{ReferenceData, RuleSet, ValidationConfig, ValidationContext, Validator, Verdict};
