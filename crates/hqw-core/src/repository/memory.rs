//! In-memory repositories

use super::{CheckoutStore, StagingRepository, WarehouseRepository};
use crate::errors::{HqError, HqErrorKind, Result, WarehouseError};
use crate::model::{
    BatchNumber, BusinessKey, Origin, RawFields, RowId, RowStatus, StagingRow, TableName,
    WarehouseRecord, WriteOutcome,
};
use crate::rules::ReferenceData;
use std::collections::{BTreeMap, HashMap};

/// Staging area backed by a map
#[derive(Debug, Clone, Default)]
pub struct MemoryStaging {
    rows: BTreeMap<RowId, StagingRow>,
    next_id: i64,
}

impl MemoryStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a new pending row, as ingestion would
    pub fn insert(&mut self, batch: BatchNumber, table: TableName, fields: RawFields) -> RowId {
        self.next_id += 1;
        let id = RowId(self.next_id);
        self.rows.insert(
            id,
            StagingRow {
                id,
                batch_number: batch,
                table,
                status: RowStatus::Pending,
                fields,
                note: None,
            },
        );
        id
    }

    pub fn row(&self, row_id: RowId) -> Option<&StagingRow> {
        self.rows.get(&row_id)
    }

    /// Operator correction of a row's fields; status is untouched
    pub fn edit_fields(&mut self, row_id: RowId, fields: RawFields) -> Result<()> {
        let row = self
            .rows
            .get_mut(&row_id)
            .ok_or(WarehouseError::RowNotFound { row_id: row_id.0 })?;
        row.fields = fields;
        Ok(())
    }

    /// Operator status override, the only way a row becomes ignored
    pub fn set_status(&mut self, row_id: RowId, status: RowStatus) -> Result<()> {
        let row = self
            .rows
            .get_mut(&row_id)
            .ok_or(WarehouseError::RowNotFound { row_id: row_id.0 })?;
        row.status = status;
        Ok(())
    }
}

impl StagingRepository for MemoryStaging {
    fn rows_for_batch(&self, batch: BatchNumber) -> Result<Vec<StagingRow>> {
        Ok(self
            .rows
            .values()
            .filter(|r| r.batch_number == batch)
            .cloned()
            .collect())
    }

    fn rows_for_table(&self, table: TableName, status: RowStatus) -> Result<Vec<StagingRow>> {
        Ok(self
            .rows
            .values()
            .filter(|r| r.table == table && r.status == status)
            .cloned()
            .collect())
    }

    fn current_status(&self, row_id: RowId) -> Result<Option<RowStatus>> {
        Ok(self.rows.get(&row_id).map(|r| r.status))
    }

    fn transition(
        &mut self,
        row_id: RowId,
        from: RowStatus,
        to: RowStatus,
        note: Option<&str>,
    ) -> Result<bool> {
        from.check_transition(row_id.0, to)?;
        let row = self
            .rows
            .get_mut(&row_id)
            .ok_or(WarehouseError::RowNotFound { row_id: row_id.0 })?;
        if row.status != from {
            return Ok(false);
        }
        row.status = to;
        row.note = note.map(str::to_string);
        Ok(true)
    }
}

/// A committed warehouse record with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub origin: Origin,
    pub record: WarehouseRecord,
    pub note: Option<String>,
}

/// Warehouse backed by a map keyed on business key
#[derive(Debug, Clone, Default)]
pub struct MemoryWarehouse {
    records: HashMap<BusinessKey, StoredRecord>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &BusinessKey) -> Option<&StoredRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &StoredRecord> {
        self.records.values()
    }
}

impl WarehouseRepository for MemoryWarehouse {
    fn reference_data(&self) -> Result<ReferenceData> {
        let mut reference = ReferenceData::new();
        for stored in self.records.values() {
            reference.absorb(&stored.record);
        }
        Ok(reference)
    }

    fn upsert(
        &mut self,
        origin: Origin,
        record: &WarehouseRecord,
        note: Option<&str>,
    ) -> Result<WriteOutcome> {
        let key = record.business_key();
        if self.records.contains_key(&key) {
            return Ok(WriteOutcome::AlreadyPresent);
        }
        self.records.insert(
            key,
            StoredRecord {
                origin,
                record: record.clone(),
                note: note.map(str::to_string),
            },
        );
        Ok(WriteOutcome::Inserted)
    }

    fn contains(&self, key: &BusinessKey) -> Result<bool> {
        Ok(self.records.contains_key(key))
    }
}

/// Both sides of a checkout held in memory.
///
/// A unit of work snapshots both repositories; rollback restores the
/// snapshot. `S` and `W` default to the plain map-backed repositories and
/// can be swapped for wrappers that inject failures.
#[derive(Debug, Default)]
pub struct MemoryStore<S = MemoryStaging, W = MemoryWarehouse> {
    pub staging: S,
    pub warehouse: W,
    snapshot: Option<(S, W)>,
}

impl<S, W> MemoryStore<S, W> {
    pub fn new(staging: S, warehouse: W) -> Self {
        Self {
            staging,
            warehouse,
            snapshot: None,
        }
    }

    pub fn in_unit(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl<S, W> CheckoutStore for MemoryStore<S, W>
where
    S: StagingRepository + Clone,
    W: WarehouseRepository + Clone,
{
    fn staging(&self) -> &dyn StagingRepository {
        &self.staging
    }

    fn staging_mut(&mut self) -> &mut dyn StagingRepository {
        &mut self.staging
    }

    fn warehouse(&self) -> &dyn WarehouseRepository {
        &self.warehouse
    }

    fn warehouse_mut(&mut self) -> &mut dyn WarehouseRepository {
        &mut self.warehouse
    }

    fn begin_unit(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(HqError::new(HqErrorKind::Persistence)
                .with_op("begin_unit")
                .with_message("a unit of work is already open"));
        }
        self.snapshot = Some((self.staging.clone(), self.warehouse.clone()));
        Ok(())
    }

    fn commit_unit(&mut self) -> Result<()> {
        match self.snapshot.take() {
            Some(_) => Ok(()),
            None => Err(HqError::new(HqErrorKind::Persistence)
                .with_op("commit_unit")
                .with_message("no unit of work is open")),
        }
    }

    fn rollback_unit(&mut self) -> Result<()> {
        if let Some((staging, warehouse)) = self.snapshot.take() {
            self.staging = staging;
            self.warehouse = warehouse;
        }
        Ok(())
    }
}
