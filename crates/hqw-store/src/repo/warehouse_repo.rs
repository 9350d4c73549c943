//! Warehouse repository over the currency, forex and offer tables

#![allow(clippy::result_large_err)]

use crate::db;
use crate::errors::{decode_error, from_rusqlite, Result};
use chrono::NaiveDate;
use hqw_core::errors::{HqError, HqErrorKind};
use hqw_core::model::{
    BatchNumber, BusinessKey, CurrencyCode, CurrencyRecord, ForexRecord, OfferRecord, Origin,
    RowId, WarehouseRecord, WarehouseTable, WriteOutcome,
};
use hqw_core::repository::WarehouseRepository;
use hqw_core::rules::ReferenceData;
use rusqlite::{Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Provenance of a stored warehouse row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseEntry {
    pub batch_number: i64,
    pub origin_row_id: i64,
    pub quality_note: Option<String>,
}

/// SQLite-backed warehouse
pub struct SqliteWarehouseRepo {
    conn: Rc<Connection>,
}

impl SqliteWarehouseRepo {
    /// Open (and migrate) the warehouse database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(db::open_warehouse(path)?))
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

    /// Number of rows in one warehouse table
    pub fn count(&self, table: WarehouseTable) -> Result<i64> {
        self.conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", table.as_str()),
                [],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)
    }

    /// Origin and quality note of the row stored under `key`
    pub fn entry(&self, key: &BusinessKey) -> Result<Option<WarehouseEntry>> {
        let (sql, params) = key_lookup(key, "batch_number, origin_row_id, quality_note");
        self.conn
            .query_row(&sql, rusqlite::params_from_iter(params), |row| {
                Ok(WarehouseEntry {
                    batch_number: row.get(0)?,
                    origin_row_id: row.get(1)?,
                    quality_note: row.get(2)?,
                })
            })
            .optional()
            .map_err(from_rusqlite)
    }

    /// Flag a stored valid offer as withdrawn. Returns whether an offer
    /// under `key` was found.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `key` does not name a row of `valid_offers`.
    pub fn mark_offer_invalid(&self, key: &BusinessKey) -> Result<bool> {
        let BusinessKey::Offer {
            table: WarehouseTable::ValidOffers,
            hotel_id,
            breakfast_included,
            checkin_date,
            checkout_date,
        } = key
        else {
            return Err(HqError::new(HqErrorKind::InvalidInput)
                .with_op("mark_offer_invalid")
                .with_message(format!("{} is not a valid offer", key)));
        };
        let changed = self
            .conn
            .execute(
                "UPDATE valid_offers SET invalid = 1
                 WHERE hotel_id = ?1 AND breakfast_included = ?2 AND checkin_date = ?3 AND checkout_date = ?4",
                rusqlite::params![
                    hotel_id,
                    breakfast_included,
                    checkin_date.format(DATE_FORMAT).to_string(),
                    checkout_date.format(DATE_FORMAT).to_string(),
                ],
            )
            .map_err(from_rusqlite)?;
        Ok(changed > 0)
    }

    fn insert_currency(&self, origin: &OriginColumns, c: &CurrencyRecord) -> Result<usize> {
        self.conn
            .execute(
                "INSERT INTO currencies (code, name, usd_rate, batch_number, origin_row_id, insert_date, quality_note)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(code) DO NOTHING",
                rusqlite::params![
                    c.code.as_str(),
                    c.name,
                    c.usd_rate.map(|r| r.to_string()),
                    origin.batch_number,
                    origin.row_id,
                    origin.insert_date,
                    origin.note,
                ],
            )
            .map_err(from_rusqlite)
    }

    fn insert_forex(&self, origin: &OriginColumns, f: &ForexRecord) -> Result<usize> {
        self.conn
            .execute(
                "INSERT INTO forex (currency_from, currency_to, date_valid, rate, batch_number, origin_row_id, insert_date, quality_note)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(currency_from, currency_to, date_valid) DO NOTHING",
                rusqlite::params![
                    f.currency_from.as_str(),
                    f.currency_to.as_str(),
                    f.date_valid.format(DATE_FORMAT).to_string(),
                    f.rate.to_string(),
                    origin.batch_number,
                    origin.row_id,
                    origin.insert_date,
                    origin.note,
                ],
            )
            .map_err(from_rusqlite)
    }

    fn insert_offer(
        &self,
        table: WarehouseTable,
        origin: &OriginColumns,
        o: &OfferRecord,
    ) -> Result<usize> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {} (hotel_id, price_usd, original_price, original_currency, breakfast_included,
                        valid_from_date, valid_from_time, valid_to_date, valid_to_time, checkin_date, checkout_date,
                        batch_number, origin_row_id, insert_date, quality_note)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                     ON CONFLICT(hotel_id, breakfast_included, checkin_date, checkout_date) DO NOTHING",
                    table.as_str()
                ),
                rusqlite::params![
                    o.hotel_id,
                    o.price_usd.to_string(),
                    o.original_price.to_string(),
                    o.original_currency.as_str(),
                    o.breakfast_included,
                    o.valid_from.format(DATE_FORMAT).to_string(),
                    o.valid_from.format(TIME_FORMAT).to_string(),
                    o.valid_to.format(DATE_FORMAT).to_string(),
                    o.valid_to.format(TIME_FORMAT).to_string(),
                    o.checkin_date.format(DATE_FORMAT).to_string(),
                    o.checkout_date.format(DATE_FORMAT).to_string(),
                    origin.batch_number,
                    origin.row_id,
                    origin.insert_date,
                    origin.note,
                ],
            )
            .map_err(from_rusqlite)
    }
}

/// Origin columns shared by every warehouse table
struct OriginColumns<'a> {
    batch_number: i64,
    row_id: i64,
    insert_date: i64,
    note: Option<&'a str>,
}

impl WarehouseRepository for SqliteWarehouseRepo {
    fn reference_data(&self) -> Result<ReferenceData> {
        let mut reference = ReferenceData::new();

        let mut stmt = self
            .conn
            .prepare("SELECT code FROM currencies ORDER BY code")
            .map_err(from_rusqlite)?;
        let codes = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        for code in codes {
            reference.add_currency(decode_code("currencies.code", &code)?);
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT currency_from, date_valid, rate FROM forex
                 WHERE currency_to = 'USD' ORDER BY currency_from, date_valid",
            )
            .map_err(from_rusqlite)?;
        let rates = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        for (from, date, rate) in rates {
            let from = decode_code("forex.currency_from", &from)?;
            let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
                .map_err(|e| decode_error("forex.date_valid", &date, e))?;
            let rate =
                Decimal::from_str(&rate).map_err(|e| decode_error("forex.rate", &rate, e))?;
            reference.add_usd_rate(from, date, rate);
        }

        Ok(reference)
    }

    fn upsert(
        &mut self,
        origin: Origin,
        record: &WarehouseRecord,
        note: Option<&str>,
    ) -> Result<WriteOutcome> {
        let columns = OriginColumns {
            batch_number: batch_column(origin.batch_number)?,
            row_id: origin.row_id.0,
            insert_date: chrono::Utc::now().timestamp(),
            note,
        };
        let inserted = match record {
            WarehouseRecord::Currency(c) => self.insert_currency(&columns, c)?,
            WarehouseRecord::Forex(f) => self.insert_forex(&columns, f)?,
            WarehouseRecord::Offer(o) => self.insert_offer(record.target_table(), &columns, o)?,
        };
        Ok(if inserted == 0 {
            WriteOutcome::AlreadyPresent
        } else {
            WriteOutcome::Inserted
        })
    }

    fn contains(&self, key: &BusinessKey) -> Result<bool> {
        let (sql, params) = key_lookup(key, "1");
        let found = self
            .conn
            .query_row(&sql, rusqlite::params_from_iter(params), |_| Ok(()))
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_some())
    }
}

/// SELECT of `columns` from the row stored under `key`, with its parameters
fn key_lookup(key: &BusinessKey, columns: &str) -> (String, Vec<String>) {
    match key {
        BusinessKey::Currency { code } => (
            format!("SELECT {} FROM currencies WHERE code = ?1", columns),
            vec![code.as_str().to_string()],
        ),
        BusinessKey::Forex {
            currency_from,
            currency_to,
            date_valid,
        } => (
            format!(
                "SELECT {} FROM forex WHERE currency_from = ?1 AND currency_to = ?2 AND date_valid = ?3",
                columns
            ),
            vec![
                currency_from.as_str().to_string(),
                currency_to.as_str().to_string(),
                date_valid.format(DATE_FORMAT).to_string(),
            ],
        ),
        BusinessKey::Offer {
            table,
            hotel_id,
            breakfast_included,
            checkin_date,
            checkout_date,
        } => (
            format!(
                "SELECT {} FROM {} WHERE hotel_id = CAST(?1 AS INTEGER)
                 AND breakfast_included = CAST(?2 AS INTEGER) AND checkin_date = ?3 AND checkout_date = ?4",
                columns,
                table.as_str()
            ),
            vec![
                hotel_id.to_string(),
                i64::from(*breakfast_included).to_string(),
                checkin_date.format(DATE_FORMAT).to_string(),
                checkout_date.format(DATE_FORMAT).to_string(),
            ],
        ),
    }
}

fn batch_column(batch: BatchNumber) -> Result<i64> {
    i64::try_from(batch.get()).map_err(|e| decode_error("batch_number", &batch.to_string(), e))
}

fn decode_code(column: &str, value: &str) -> Result<CurrencyCode> {
    CurrencyCode::parse(value).ok_or_else(|| decode_error(column, value, "not a currency code"))
}
