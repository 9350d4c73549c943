//! Row checkout: validate each candidate and promote it or quarantine it.
//!
//! Per row, in candidate order:
//! 1. Re-read the status; committed and ignored rows are skipped.
//! 2. Validate against the reference data snapshot.
//! 3. Valid or questionable: in one unit of work, upsert into the warehouse
//!    and move the row to `committed` with a compare-and-set on its status.
//!    If either step fails the unit is rolled back, so the row keeps its
//!    status and no warehouse record from it remains.
//! 4. Invalid: move the row to `error` with the reason as its note.
//!
//! A repository failure on one row becomes an `errored` outcome for that
//! row, leaves its status as it was, and never stops the run.

#![allow(clippy::result_large_err)]

use chrono::NaiveDate;
use hqw_core::errors::{HqError, Result, WarehouseError};
use hqw_core::model::{
    CheckoutOutcome, CheckoutReport, Origin, RowStatus, StagingRow, WarehouseRecord, WriteOutcome,
};
use hqw_core::repository::CheckoutStore;
use hqw_core::rules::{ReferenceData, ValidationContext, Validator, Verdict};
use hqw_core_types::RunId;
use std::collections::HashSet;
use std::time::Instant;

/// Per-run settings
#[derive(Debug, Clone)]
pub struct CheckoutOptions {
    /// Evaluation date handed to the validator
    pub as_of: NaiveDate,
    /// Correlation id; a fresh one is generated when absent
    pub run_id: Option<RunId>,
}

impl CheckoutOptions {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            run_id: None,
        }
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }
}

/// Process `candidates` in order and report one outcome per distinct row.
///
/// # Errors
///
/// Only setup failures: the warehouse reference data could not be loaded,
/// in which case no row has been touched.
pub fn run_checkout(
    candidates: Vec<StagingRow>,
    store: &mut dyn CheckoutStore,
    validator: &dyn Validator,
    options: &CheckoutOptions,
) -> Result<CheckoutReport> {
    let start = Instant::now();
    let run_id = options.run_id.clone().unwrap_or_default();
    hqw_core::log_op_start!(
        "checkout_rows",
        run_id = run_id.as_str(),
        candidates = candidates.len() as u64
    );

    let mut reference = match store.warehouse().reference_data() {
        Ok(reference) => reference,
        Err(e) => {
            let err = e
                .with_op("load_reference_data")
                .with_run_id(run_id.clone());
            let duration_ms = start.elapsed().as_millis() as u64;
            hqw_core::log_op_error!("checkout_rows", err.clone(), duration_ms = duration_ms);
            return Err(err);
        }
    };

    let mut report = CheckoutReport::new(run_id.clone());
    let mut seen = HashSet::new();
    for row in candidates {
        if !seen.insert(row.id) {
            tracing::debug!(row_id = row.id.0, "duplicate candidate skipped");
            continue;
        }
        let outcome = {
            let mut checkout = RowCheckout {
                store: &mut *store,
                validator,
                reference: &mut reference,
                as_of: options.as_of,
            };
            checkout.process(&row)
        };
        tracing::debug!(
            run_id = run_id.as_str(),
            row_id = row.id.0,
            table = row.table.as_str(),
            decision = outcome.decision.as_str(),
            detail = outcome.message.as_deref().unwrap_or(""),
            "row processed"
        );
        report.push(outcome);
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    hqw_core::log_op_end!(
        "checkout_rows",
        duration_ms = duration_ms,
        run_id = run_id.as_str(),
        committed = report.summary.committed as u64,
        errored = report.summary.errored as u64,
        ignored = report.summary.ignored as u64
    );
    Ok(report)
}

/// Everything one row needs; borrowed afresh for every row
struct RowCheckout<'a> {
    store: &'a mut dyn CheckoutStore,
    validator: &'a dyn Validator,
    reference: &'a mut ReferenceData,
    as_of: NaiveDate,
}

impl RowCheckout<'_> {
    fn process(&mut self, row: &StagingRow) -> CheckoutOutcome {
        let current = match self.store.staging().current_status(row.id) {
            Ok(Some(status)) => status,
            Ok(None) => {
                return CheckoutOutcome::errored(row.id, row.table, "row no longer exists")
            }
            Err(e) => return storage_failure(row, e),
        };

        match current {
            RowStatus::Committed => {
                return CheckoutOutcome::ignored(row.id, row.table, "already committed")
            }
            RowStatus::Ignored => {
                return CheckoutOutcome::ignored(row.id, row.table, "marked for ignore")
            }
            RowStatus::Pending | RowStatus::Error => {}
        }

        let verdict = {
            let ctx = ValidationContext::new(self.as_of, self.reference);
            self.validator.validate(row.table, &row.fields, &ctx)
        };
        match verdict {
            Verdict::Valid(record) => self.commit(row, current, record, None),
            Verdict::Questionable(record, note) => self.commit(row, current, record, Some(note)),
            Verdict::Invalid(reason) => self.quarantine(row, current, reason),
        }
    }

    fn commit(
        &mut self,
        row: &StagingRow,
        current: RowStatus,
        record: WarehouseRecord,
        note: Option<String>,
    ) -> CheckoutOutcome {
        if let Err(e) = self.store.begin_unit() {
            return storage_failure(row, e);
        }
        match self.promote(row, current, &record, note.as_deref()) {
            Ok(()) => match self.store.commit_unit() {
                Ok(()) => {
                    self.reference.absorb(&record);
                    CheckoutOutcome::committed(row.id, row.table, note)
                }
                Err(e) => {
                    self.abandon(row);
                    storage_failure(row, e)
                }
            },
            Err(e) => {
                self.abandon(row);
                storage_failure(row, e)
            }
        }
    }

    /// Warehouse write plus status change, inside the open unit of work
    fn promote(
        &mut self,
        row: &StagingRow,
        current: RowStatus,
        record: &WarehouseRecord,
        note: Option<&str>,
    ) -> Result<()> {
        let origin = Origin {
            batch_number: row.batch_number,
            row_id: row.id,
        };
        if self.store.warehouse_mut().upsert(origin, record, note)? == WriteOutcome::AlreadyPresent
        {
            tracing::debug!(
                row_id = row.id.0,
                key = %record.business_key(),
                "business key already in warehouse"
            );
        }
        if self
            .store
            .staging_mut()
            .transition(row.id, current, RowStatus::Committed, note)?
        {
            Ok(())
        } else {
            Err(status_conflict(row, current))
        }
    }

    fn abandon(&mut self, row: &StagingRow) {
        if let Err(e) = self.store.rollback_unit() {
            tracing::warn!(
                row_id = row.id.0,
                err_code = e.code(),
                err_message = e.message(),
                "rollback failed"
            );
        }
    }

    fn quarantine(
        &mut self,
        row: &StagingRow,
        current: RowStatus,
        reason: String,
    ) -> CheckoutOutcome {
        match self
            .store
            .staging_mut()
            .transition(row.id, current, RowStatus::Error, Some(&reason))
        {
            Ok(true) => CheckoutOutcome::errored(row.id, row.table, reason),
            Ok(false) => storage_failure(row, status_conflict(row, current)),
            Err(e) => storage_failure(row, e),
        }
    }
}

fn storage_failure(row: &StagingRow, err: HqError) -> CheckoutOutcome {
    let err = err.with_row_id(row.id.0);
    tracing::warn!(
        row_id = row.id.0,
        err_code = err.code(),
        err_message = err.message(),
        "row left as found"
    );
    CheckoutOutcome::errored(row.id, row.table, err.to_string())
}

fn status_conflict(row: &StagingRow, expected: RowStatus) -> HqError {
    WarehouseError::StatusConflict {
        row_id: row.id.0,
        expected: expected.to_string(),
    }
    .into()
}
