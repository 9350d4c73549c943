//! Table checkout: retry the `error` rows of one table.

#![allow(clippy::result_large_err)]

use crate::commands::checkout::{run_checkout, CheckoutOptions};
use hqw_core::errors::Result;
use hqw_core::model::{CheckoutReport, RowStatus, TableName};
use hqw_core::repository::CheckoutStore;
use hqw_core::rules::Validator;
use std::time::Instant;

/// Re-validate every `error` row of `table`, typically after the rows were
/// corrected by hand. Ignored rows are never selected. An empty selection is
/// a successful run with nothing to do.
///
/// # Errors
///
/// Selection and reference-data failures; nothing is touched in either case.
pub fn checkout_table(
    table: TableName,
    store: &mut dyn CheckoutStore,
    validator: &dyn Validator,
    options: &CheckoutOptions,
) -> Result<CheckoutReport> {
    let start = Instant::now();
    hqw_core::log_op_start!("checkout_table", table = table.as_str());

    let result = store
        .staging()
        .rows_for_table(table, RowStatus::Error)
        .and_then(|rows| run_checkout(rows, store, validator, options))
        .map_err(|e| e.with_table(table.as_str()));

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(report) => {
            hqw_core::log_op_end!(
                "checkout_table",
                duration_ms = duration_ms,
                table = table.as_str(),
                committed = report.summary.committed as u64,
                errored = report.summary.errored as u64
            );
        }
        Err(e) => {
            hqw_core::log_op_error!("checkout_table", e.clone(), duration_ms = duration_ms);
        }
    }
    result
}
