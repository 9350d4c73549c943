//! Storage seams for the checkout engine
//!
//! The engine only talks to these traits. `hqw-store` implements them on
//! SQLite; [`memory`] holds in-memory versions for tests.
//!
//! A [`CheckoutStore`] pairs the two sides so that promoting a row (its
//! warehouse write and its status change) runs as one unit of work.

pub mod memory;

use crate::errors::Result;
use crate::model::{
    BatchNumber, BusinessKey, Origin, RowId, RowStatus, StagingRow, TableName, WarehouseRecord,
    WriteOutcome,
};
use crate::rules::ReferenceData;

pub use memory::{MemoryStaging, MemoryStore, MemoryWarehouse};

/// Access to the staging area
pub trait StagingRepository {
    /// Every row of a batch whatever its status, in id order. Empty when the
    /// batch does not exist.
    fn rows_for_batch(&self, batch: BatchNumber) -> Result<Vec<StagingRow>>;

    /// Rows of one table currently in `status`, in id order
    fn rows_for_table(&self, table: TableName, status: RowStatus) -> Result<Vec<StagingRow>>;

    /// Status right now, or `None` for an unknown row
    fn current_status(&self, row_id: RowId) -> Result<Option<RowStatus>>;

    /// Move a row from `from` to `to` and store `note` as its diagnostic.
    ///
    /// Compare-and-set: returns `Ok(false)` without writing when the row is
    /// no longer in `from`.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` when `from -> to` is not an edge of the state
    /// machine, `NotFound` for an unknown row, storage errors otherwise.
    fn transition(
        &mut self,
        row_id: RowId,
        from: RowStatus,
        to: RowStatus,
        note: Option<&str>,
    ) -> Result<bool>;
}

/// Access to the warehouse
pub trait WarehouseRepository {
    /// Currencies and USD rates already committed
    fn reference_data(&self) -> Result<ReferenceData>;

    /// Insert a record unless its business key is already present.
    fn upsert(
        &mut self,
        origin: Origin,
        record: &WarehouseRecord,
        note: Option<&str>,
    ) -> Result<WriteOutcome>;

    fn contains(&self, key: &BusinessKey) -> Result<bool>;
}

/// Staging and warehouse behind one handle, with row-level units of work.
///
/// Between [`begin_unit`](Self::begin_unit) and
/// [`commit_unit`](Self::commit_unit) writes through either repository are
/// provisional; [`rollback_unit`](Self::rollback_unit) discards all of them.
pub trait CheckoutStore {
    fn staging(&self) -> &dyn StagingRepository;

    fn staging_mut(&mut self) -> &mut dyn StagingRepository;

    fn warehouse(&self) -> &dyn WarehouseRepository;

    fn warehouse_mut(&mut self) -> &mut dyn WarehouseRepository;

    /// Open a unit of work. Units do not nest.
    fn begin_unit(&mut self) -> Result<()>;

    /// Make every write of the open unit durable.
    fn commit_unit(&mut self) -> Result<()>;

    /// Discard every write of the open unit; a no-op when none is open.
    fn rollback_unit(&mut self) -> Result<()>;
}
