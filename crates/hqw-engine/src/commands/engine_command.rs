//! Engine-level commands, one per entry point.

#![allow(clippy::result_large_err)]

use crate::commands::batch::checkout_batch;
use crate::commands::checkout::CheckoutOptions;
use crate::commands::table::checkout_table;
use hqw_core::errors::Result;
use hqw_core::model::{BatchNumber, CheckoutReport, TableName};
use hqw_core::repository::CheckoutStore;
use hqw_core::rules::Validator;

/// A checkout request as received from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Check out every row of a batch
    CheckoutBatch { batch_number: u64 },
    /// Retry the error rows of a table, named as typed by the user
    CheckoutTable { table: String },
}

/// An [`EngineCommand`] whose arguments have been checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutTarget {
    Batch(BatchNumber),
    Table(TableName),
}

impl EngineCommand {
    /// Check the arguments without touching any store.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for batch 0, `UnknownTable` for a name outside the
    /// staged tables.
    pub fn target(&self) -> Result<CheckoutTarget> {
        match self {
            EngineCommand::CheckoutBatch { batch_number } => {
                Ok(CheckoutTarget::Batch(BatchNumber::new(*batch_number)?))
            }
            EngineCommand::CheckoutTable { table } => {
                Ok(CheckoutTarget::Table(table.parse::<TableName>()?))
            }
        }
    }
}

/// Run a checked target.
///
/// # Errors
///
/// `BatchNotFound` before any row is touched, and setup failures.
pub fn apply_checkout_target(
    target: CheckoutTarget,
    store: &mut dyn CheckoutStore,
    validator: &dyn Validator,
    options: &CheckoutOptions,
) -> Result<CheckoutReport> {
    match target {
        CheckoutTarget::Batch(batch) => checkout_batch(batch, store, validator, options),
        CheckoutTarget::Table(table) => checkout_table(table, store, validator, options),
    }
}

/// Validate the command's arguments and run it.
///
/// # Errors
///
/// Invocation errors (`InvalidInput` for batch 0, `UnknownTable`,
/// `BatchNotFound`) before any row is touched, and setup failures.
pub fn apply_engine_command(
    cmd: EngineCommand,
    store: &mut dyn CheckoutStore,
    validator: &dyn Validator,
    options: &CheckoutOptions,
) -> Result<CheckoutReport> {
    let target = cmd.target()?;
    apply_checkout_target(target, store, validator, options)
}
