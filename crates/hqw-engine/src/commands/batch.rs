//! Batch checkout: every row of one batch, whatever its status.

#![allow(clippy::result_large_err)]

use crate::commands::checkout::{run_checkout, CheckoutOptions};
use hqw_core::errors::{Result, WarehouseError};
use hqw_core::model::{BatchNumber, CheckoutReport};
use hqw_core::repository::CheckoutStore;
use hqw_core::rules::Validator;
use std::time::Instant;

/// Check out a whole batch in row creation order.
///
/// Committed and ignored rows of the batch come back as `ignored`
/// outcomes, so re-running a batch is safe.
///
/// # Errors
///
/// `BatchNotFound` when no staging row carries `batch`; selection and
/// reference-data failures. Nothing is touched in either case.
pub fn checkout_batch(
    batch: BatchNumber,
    store: &mut dyn CheckoutStore,
    validator: &dyn Validator,
    options: &CheckoutOptions,
) -> Result<CheckoutReport> {
    let start = Instant::now();
    hqw_core::log_op_start!("checkout_batch", batch_number = batch.get());

    let result = store
        .staging()
        .rows_for_batch(batch)
        .and_then(|rows| {
            if rows.is_empty() {
                Err(WarehouseError::BatchNotFound {
                    batch_number: batch.get(),
                }
                .into())
            } else {
                Ok(rows)
            }
        })
        .and_then(|rows| run_checkout(rows, store, validator, options))
        .map_err(|e| e.with_batch(batch.get()));

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(report) => {
            hqw_core::log_op_end!(
                "checkout_batch",
                duration_ms = duration_ms,
                batch_number = batch.get(),
                committed = report.summary.committed as u64,
                errored = report.summary.errored as u64
            );
        }
        Err(e) => {
            hqw_core::log_op_error!("checkout_batch", e.clone(), duration_ms = duration_ms);
        }
    }
    result
}
