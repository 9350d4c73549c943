#![allow(dead_code)]

use chrono::NaiveDate;
use hqw_core::errors::{HqError, HqErrorKind, Result};
use hqw_core::model::{
    BatchNumber, BusinessKey, CurrencyCode, CurrencyRecord, ForexRecord, Origin, RawFields,
    RowId, RowStatus, StagingRow, TableName, WarehouseRecord, WriteOutcome,
};
use hqw_core::repository::{
    MemoryStaging, MemoryStore, MemoryWarehouse, StagingRepository, WarehouseRepository,
};
use hqw_core::rules::ReferenceData;
use hqw_engine::CheckoutOptions;
use rust_decimal::Decimal;
use serde_json::{json, Value};

pub fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 3, 1).unwrap()
}

pub fn options() -> CheckoutOptions {
    CheckoutOptions::new(as_of())
}

pub fn batch(n: u64) -> BatchNumber {
    BatchNumber::new(n).unwrap()
}

pub fn fields(value: Value) -> RawFields {
    RawFields::from_value(&value)
}

pub fn offer_payload(hotel_id: u32) -> Value {
    json!({
        "hotel_id": hotel_id,
        "original_price": "100.00",
        "original_currency": "EUR",
        "breakfast_included": "t",
        "valid_from": "2016-03-01 00:00:00",
        "valid_to": "2016-03-20 12:00:00",
        "checkin_date": "2016-04-01",
        "checkout_date": "2016-04-03"
    })
}

/// Records already in the warehouse before any test batch: USD, EUR and a
/// EUR to USD rate.
pub fn seed_records() -> Vec<WarehouseRecord> {
    let code = |s: &str| CurrencyCode::parse(s).unwrap();
    vec![
        WarehouseRecord::Currency(CurrencyRecord {
            code: code("USD"),
            name: "US dollar".to_string(),
            usd_rate: Some(Decimal::ONE),
        }),
        WarehouseRecord::Currency(CurrencyRecord {
            code: code("EUR"),
            name: "Euro".to_string(),
            usd_rate: None,
        }),
        WarehouseRecord::Forex(ForexRecord {
            currency_from: code("EUR"),
            currency_to: code("USD"),
            date_valid: NaiveDate::from_ymd_opt(2016, 2, 1).unwrap(),
            rate: Decimal::new(11, 1),
        }),
    ]
}

pub fn seed_warehouse(warehouse: &mut dyn WarehouseRepository) {
    for (i, record) in seed_records().iter().enumerate() {
        let origin = Origin {
            batch_number: batch(1),
            row_id: RowId(1000 + i as i64),
        };
        warehouse.upsert(origin, record, None).unwrap();
    }
}

/// Batch 3: three valid rows, one offer missing its currency code and one
/// forex rate slightly out of bounds, in staging order.
pub fn batch_three() -> Vec<(TableName, Value)> {
    let mut missing_currency = offer_payload(18);
    missing_currency
        .as_object_mut()
        .unwrap()
        .remove("original_currency");
    vec![
        (TableName::Currency, json!({"code": "gbp", "name": "Pound sterling"})),
        (
            TableName::Forex,
            json!({"currency_from": "GBP", "currency_to": "USD", "date_valid": "2016-02-28", "rate": "1.42"}),
        ),
        (TableName::Offer, offer_payload(17)),
        (TableName::Offer, missing_currency),
        (
            TableName::Forex,
            json!({"currency_from": "GBP", "currency_to": "EUR", "date_valid": "2016-02-28", "rate": "100000.5"}),
        ),
    ]
}

pub fn stage_memory(staging: &mut MemoryStaging, n: u64, rows: Vec<(TableName, Value)>) -> Vec<RowId> {
    rows.into_iter()
        .map(|(table, value)| staging.insert(batch(n), table, fields(value)))
        .collect()
}

pub fn memory_fixture() -> (MemoryStore, Vec<RowId>) {
    let mut staging = MemoryStaging::new();
    let mut warehouse = MemoryWarehouse::new();
    seed_warehouse(&mut warehouse);
    let ids = stage_memory(&mut staging, 3, batch_three());
    (MemoryStore::new(staging, warehouse), ids)
}

/// Warehouse that fails every write coming from one staging row
#[derive(Clone)]
pub struct FailingWarehouse {
    pub inner: MemoryWarehouse,
    pub fail_row: RowId,
    pub fail_reference: bool,
}

impl WarehouseRepository for FailingWarehouse {
    fn reference_data(&self) -> Result<ReferenceData> {
        if self.fail_reference {
            return Err(HqError::new(HqErrorKind::Persistence).with_message("database is locked"));
        }
        self.inner.reference_data()
    }

    fn upsert(
        &mut self,
        origin: Origin,
        record: &WarehouseRecord,
        note: Option<&str>,
    ) -> Result<WriteOutcome> {
        if origin.row_id == self.fail_row {
            return Err(HqError::new(HqErrorKind::Persistence).with_message("disk I/O error"));
        }
        self.inner.upsert(origin, record, note)
    }

    fn contains(&self, key: &BusinessKey) -> Result<bool> {
        self.inner.contains(key)
    }
}

/// Staging whose status changes underneath the engine for one row, as if a
/// concurrent run had already moved it
#[derive(Clone)]
pub struct RacingStaging {
    pub inner: MemoryStaging,
    pub contested_row: RowId,
}

impl StagingRepository for RacingStaging {
    fn rows_for_batch(&self, batch: BatchNumber) -> Result<Vec<StagingRow>> {
        self.inner.rows_for_batch(batch)
    }

    fn rows_for_table(&self, table: TableName, status: RowStatus) -> Result<Vec<StagingRow>> {
        self.inner.rows_for_table(table, status)
    }

    fn current_status(&self, row_id: RowId) -> Result<Option<RowStatus>> {
        self.inner.current_status(row_id)
    }

    fn transition(
        &mut self,
        row_id: RowId,
        from: RowStatus,
        to: RowStatus,
        note: Option<&str>,
    ) -> Result<bool> {
        if row_id == self.contested_row {
            self.inner.set_status(row_id, RowStatus::Committed)?;
        }
        self.inner.transition(row_id, from, to, note)
    }
}

/// Staging that cannot mark one row committed, as when the disk fills up
/// between the warehouse write and the status change
#[derive(Clone)]
pub struct UnwritableStaging {
    pub inner: MemoryStaging,
    pub stuck_row: RowId,
}

impl StagingRepository for UnwritableStaging {
    fn rows_for_batch(&self, batch: BatchNumber) -> Result<Vec<StagingRow>> {
        self.inner.rows_for_batch(batch)
    }

    fn rows_for_table(&self, table: TableName, status: RowStatus) -> Result<Vec<StagingRow>> {
        self.inner.rows_for_table(table, status)
    }

    fn current_status(&self, row_id: RowId) -> Result<Option<RowStatus>> {
        self.inner.current_status(row_id)
    }

    fn transition(
        &mut self,
        row_id: RowId,
        from: RowStatus,
        to: RowStatus,
        note: Option<&str>,
    ) -> Result<bool> {
        if row_id == self.stuck_row && to == RowStatus::Committed {
            return Err(HqError::new(HqErrorKind::Persistence).with_message("database or disk is full"));
        }
        self.inner.transition(row_id, from, to, note)
    }
}
