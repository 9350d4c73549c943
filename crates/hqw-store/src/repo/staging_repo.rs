//! Staging repository over `staging_rows`

#![allow(clippy::result_large_err)]

use crate::db;
use crate::errors::{decode_error, from_rusqlite, Result};
use hqw_core::errors::WarehouseError;
use hqw_core::model::{BatchNumber, RawFields, RowId, RowStatus, StagingRow, TableName};
use hqw_core::repository::StagingRepository;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::rc::Rc;

const SELECT_ROW: &str =
    "SELECT id, batch_number, table_name, status, payload, note FROM staging_rows";

/// Columns of one staging row before decoding
type RawRow = (i64, i64, String, String, String, Option<String>);

/// SQLite-backed staging area
pub struct SqliteStagingRepo {
    conn: Rc<Connection>,
}

impl SqliteStagingRepo {
    /// Open (and migrate) the staging database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(db::open_staging(path)?))
    }

    /// Wrap a connection that is already configured and migrated
    pub fn new(conn: Connection) -> Self {
        Self::shared(Rc::new(conn))
    }

    /// Use a connection another repository also writes through
    pub(crate) fn shared(conn: Rc<Connection>) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Stage a new pending row, as the ingestion side does
    pub fn insert_row(
        &self,
        batch: BatchNumber,
        table: TableName,
        fields: &RawFields,
    ) -> Result<RowId> {
        let now = chrono::Utc::now().timestamp();
        self.conn
            .execute(
                "INSERT INTO staging_rows (batch_number, table_name, status, payload, created_at, updated_at)
                 VALUES (?1, ?2, 'pending', ?3, ?4, ?4)",
                rusqlite::params![batch_param(batch)?, table.as_str(), fields.as_str(), now],
            )
            .map_err(from_rusqlite)?;
        Ok(RowId(self.conn.last_insert_rowid()))
    }

    /// Operator correction of a row's payload; status is untouched
    pub fn update_payload(&self, row_id: RowId, fields: &RawFields) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE staging_rows SET payload = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![fields.as_str(), chrono::Utc::now().timestamp(), row_id.0],
            )
            .map_err(from_rusqlite)?;
        if changed == 0 {
            return Err(WarehouseError::RowNotFound { row_id: row_id.0 }.into());
        }
        Ok(())
    }

    /// Operator status override, bypassing the checkout state machine
    pub fn set_status(&self, row_id: RowId, status: RowStatus) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE staging_rows SET status = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![status.as_str(), chrono::Utc::now().timestamp(), row_id.0],
            )
            .map_err(from_rusqlite)?;
        if changed == 0 {
            return Err(WarehouseError::RowNotFound { row_id: row_id.0 }.into());
        }
        Ok(())
    }

    /// Fetch one row by id
    pub fn get(&self, row_id: RowId) -> Result<Option<StagingRow>> {
        let raw = self
            .conn
            .query_row(&format!("{} WHERE id = ?", SELECT_ROW), [row_id.0], read_raw)
            .optional()
            .map_err(from_rusqlite)?;
        raw.map(decode_row).transpose()
    }

    fn select(&self, filter: &str, params: impl rusqlite::Params) -> Result<Vec<StagingRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE {} ORDER BY id", SELECT_ROW, filter))
            .map_err(from_rusqlite)?;
        let raw_rows = stmt
            .query_map(params, read_raw)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        raw_rows.into_iter().map(decode_row).collect()
    }
}

impl StagingRepository for SqliteStagingRepo {
    fn rows_for_batch(&self, batch: BatchNumber) -> Result<Vec<StagingRow>> {
        self.select("batch_number = ?1", [batch_param(batch)?])
    }

    fn rows_for_table(&self, table: TableName, status: RowStatus) -> Result<Vec<StagingRow>> {
        self.select(
            "table_name = ?1 AND status = ?2",
            [table.as_str(), status.as_str()],
        )
    }

    fn current_status(&self, row_id: RowId) -> Result<Option<RowStatus>> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM staging_rows WHERE id = ?",
                [row_id.0],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        status
            .map(|s| s.parse::<RowStatus>().map_err(Into::into))
            .transpose()
    }

    fn transition(
        &mut self,
        row_id: RowId,
        from: RowStatus,
        to: RowStatus,
        note: Option<&str>,
    ) -> Result<bool> {
        from.check_transition(row_id.0, to)?;

        let changed = self
            .conn
            .execute(
                "UPDATE staging_rows SET status = ?1, note = ?2, updated_at = ?3
                 WHERE id = ?4 AND status = ?5",
                rusqlite::params![
                    to.as_str(),
                    note,
                    chrono::Utc::now().timestamp(),
                    row_id.0,
                    from.as_str()
                ],
            )
            .map_err(from_rusqlite)?;

        if changed == 1 {
            return Ok(true);
        }
        match self.current_status(row_id)? {
            Some(_) => Ok(false),
            None => Err(WarehouseError::RowNotFound { row_id: row_id.0 }.into()),
        }
    }
}

fn batch_param(batch: BatchNumber) -> Result<i64> {
    i64::try_from(batch.get()).map_err(|_| {
        WarehouseError::InvalidBatchNumber {
            value: batch.to_string(),
        }
        .into()
    })
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_row(raw: RawRow) -> Result<StagingRow> {
    let (id, batch_number, table_name, status, payload, note) = raw;
    let batch_number = u64::try_from(batch_number)
        .map_err(|e| decode_error("batch_number", &batch_number.to_string(), e))
        .and_then(|n| BatchNumber::new(n).map_err(Into::into))?;
    Ok(StagingRow {
        id: RowId(id),
        batch_number,
        table: table_name.parse::<TableName>()?,
        status: status.parse::<RowStatus>()?,
        fields: RawFields::from_json_text(payload),
        note,
    })
}
