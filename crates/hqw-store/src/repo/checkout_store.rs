//! Staging and warehouse on one connection
//!
//! The warehouse file is attached to the staging connection, so a unit of
//! work is a single SQLite transaction spanning both files.

#![allow(clippy::result_large_err)]

use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::repo::{SqliteStagingRepo, SqliteWarehouseRepo};
use hqw_core::repository::{CheckoutStore, StagingRepository, WarehouseRepository};
use rusqlite::Connection;
use std::path::Path;
use std::rc::Rc;

/// Both SQLite repositories sharing the staging connection
pub struct SqliteCheckoutStore {
    pub staging: SqliteStagingRepo,
    pub warehouse: SqliteWarehouseRepo,
    conn: Rc<Connection>,
}

impl SqliteCheckoutStore {
    /// Open the staging database at `staging_path`, which must exist, and the
    /// warehouse at `warehouse_path`, which is created and migrated when
    /// missing.
    pub fn open(staging_path: &Path, warehouse_path: &Path) -> Result<Self> {
        let conn = db::open_existing_staging(staging_path)?;
        drop(db::open_warehouse(warehouse_path)?);
        db::attach_warehouse(&conn, warehouse_path)?;
        let conn = Rc::new(conn);
        tracing::debug!(
            staging = %staging_path.display(),
            warehouse = %warehouse_path.display(),
            "checkout store opened"
        );

        Ok(Self {
            staging: SqliteStagingRepo::shared(Rc::clone(&conn)),
            warehouse: SqliteWarehouseRepo::shared(Rc::clone(&conn)),
            conn,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl CheckoutStore for SqliteCheckoutStore {
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
        // IMMEDIATE takes the write locks up front, before the first read
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(from_rusqlite)
            .map_err(|e| e.with_op("begin_unit"))
    }

    fn commit_unit(&mut self) -> Result<()> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(from_rusqlite)
            .map_err(|e| e.with_op("commit_unit"))
    }

    fn rollback_unit(&mut self) -> Result<()> {
        // SQLite may already have rolled back on its own after some errors
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(from_rusqlite)
            .map_err(|e| e.with_op("rollback_unit"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hqw_core::model::{
        BatchNumber, CurrencyCode, CurrencyRecord, Origin, RawFields, RowStatus, TableName,
        WarehouseRecord, WarehouseTable,
    };

    fn store(dir: &Path) -> SqliteCheckoutStore {
        drop(SqliteStagingRepo::open(dir.join("hq_stage.db")).unwrap());
        SqliteCheckoutStore::open(&dir.join("hq_stage.db"), &dir.join("hq_warehouse.db")).unwrap()
    }

    fn euro() -> WarehouseRecord {
        WarehouseRecord::Currency(CurrencyRecord {
            code: CurrencyCode::parse("EUR").unwrap(),
            name: "Euro".to_string(),
            usd_rate: None,
        })
    }

    #[test]
    fn test_rollback_spans_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(dir.path());
        let batch = BatchNumber::new(1).unwrap();
        let id = store
            .staging
            .insert_row(batch, TableName::Currency, &RawFields::from_json_text("{}"))
            .unwrap();
        let origin = Origin {
            batch_number: batch,
            row_id: id,
        };

        store.begin_unit().unwrap();
        store.warehouse_mut().upsert(origin, &euro(), None).unwrap();
        store
            .staging_mut()
            .transition(id, RowStatus::Pending, RowStatus::Committed, None)
            .unwrap();
        store.rollback_unit().unwrap();

        assert_eq!(store.warehouse.count(WarehouseTable::Currencies).unwrap(), 0);
        assert_eq!(store.staging.current_status(id).unwrap(), Some(RowStatus::Pending));

        store.begin_unit().unwrap();
        store.warehouse_mut().upsert(origin, &euro(), None).unwrap();
        store
            .staging_mut()
            .transition(id, RowStatus::Pending, RowStatus::Committed, None)
            .unwrap();
        store.commit_unit().unwrap();
        drop(store);

        let warehouse = SqliteWarehouseRepo::open(dir.path().join("hq_warehouse.db")).unwrap();
        assert_eq!(warehouse.count(WarehouseTable::Currencies).unwrap(), 1);
        let staging = SqliteStagingRepo::open(dir.path().join("hq_stage.db")).unwrap();
        assert_eq!(staging.current_status(id).unwrap(), Some(RowStatus::Committed));
    }

    #[test]
    fn test_rollback_without_open_unit_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(dir.path());
        store.rollback_unit().unwrap();
        store.begin_unit().unwrap();
        assert!(store.begin_unit().is_err());
        store.commit_unit().unwrap();
    }

    #[test]
    fn test_missing_staging_file_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("typo.db");

        let result = SqliteCheckoutStore::open(&staging, &dir.path().join("hq_warehouse.db"));

        assert!(result.is_err());
        assert!(!staging.exists());
        assert!(!dir.path().join("hq_warehouse.db").exists());
    }
}
