//! Validated warehouse records and the business keys that make their
//! insertion idempotent.

use crate::model::{BatchNumber, RowId, TableName};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code, stored upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a code, accepting any letter case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(Self(trimmed.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    pub code: CurrencyCode,
    pub name: String,
    /// Reference rate to US dollars, when the source provided one
    pub usd_rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForexRecord {
    pub currency_from: CurrencyCode,
    pub currency_to: CurrencyCode,
    pub date_valid: NaiveDate,
    pub rate: Decimal,
}

/// Whether an offer could still be booked when it left the staging area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferLifecycle {
    Current,
    /// Kept for statistics only
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub hotel_id: u32,
    pub price_usd: Decimal,
    pub original_price: Decimal,
    pub original_currency: CurrencyCode,
    pub breakfast_included: bool,
    pub valid_from: NaiveDateTime,
    pub valid_to: NaiveDateTime,
    pub checkin_date: NaiveDate,
    pub checkout_date: NaiveDate,
    pub lifecycle: OfferLifecycle,
}

/// Physical warehouse tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarehouseTable {
    Currencies,
    Forex,
    ValidOffers,
    InvalidOffers,
}

impl WarehouseTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarehouseTable::Currencies => "currencies",
            WarehouseTable::Forex => "forex",
            WarehouseTable::ValidOffers => "valid_offers",
            WarehouseTable::InvalidOffers => "invalid_offers",
        }
    }
}

impl fmt::Display for WarehouseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized row ready for the warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WarehouseRecord {
    Currency(CurrencyRecord),
    Forex(ForexRecord),
    Offer(OfferRecord),
}

impl WarehouseRecord {
    pub fn source_table(&self) -> TableName {
        match self {
            WarehouseRecord::Currency(_) => TableName::Currency,
            WarehouseRecord::Forex(_) => TableName::Forex,
            WarehouseRecord::Offer(_) => TableName::Offer,
        }
    }

    /// Expired offers go to `invalid_offers`, current ones to `valid_offers`.
    pub fn target_table(&self) -> WarehouseTable {
        match self {
            WarehouseRecord::Currency(_) => WarehouseTable::Currencies,
            WarehouseRecord::Forex(_) => WarehouseTable::Forex,
            WarehouseRecord::Offer(o) => match o.lifecycle {
                OfferLifecycle::Current => WarehouseTable::ValidOffers,
                OfferLifecycle::Expired => WarehouseTable::InvalidOffers,
            },
        }
    }

    pub fn business_key(&self) -> BusinessKey {
        match self {
            WarehouseRecord::Currency(c) => BusinessKey::Currency {
                code: c.code.clone(),
            },
            WarehouseRecord::Forex(f) => BusinessKey::Forex {
                currency_from: f.currency_from.clone(),
                currency_to: f.currency_to.clone(),
                date_valid: f.date_valid,
            },
            WarehouseRecord::Offer(o) => BusinessKey::Offer {
                table: self.target_table(),
                hotel_id: o.hotel_id,
                breakfast_included: o.breakfast_included,
                checkin_date: o.checkin_date,
                checkout_date: o.checkout_date,
            },
        }
    }
}

/// Natural key of a warehouse record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessKey {
    Currency {
        code: CurrencyCode,
    },
    Forex {
        currency_from: CurrencyCode,
        currency_to: CurrencyCode,
        date_valid: NaiveDate,
    },
    Offer {
        table: WarehouseTable,
        hotel_id: u32,
        breakfast_included: bool,
        checkin_date: NaiveDate,
        checkout_date: NaiveDate,
    },
}

impl fmt::Display for BusinessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessKey::Currency { code } => write!(f, "currencies[{}]", code),
            BusinessKey::Forex {
                currency_from,
                currency_to,
                date_valid,
            } => write!(f, "forex[{}->{}@{}]", currency_from, currency_to, date_valid),
            BusinessKey::Offer {
                table,
                hotel_id,
                breakfast_included,
                checkin_date,
                checkout_date,
            } => write!(
                f,
                "{}[hotel {} breakfast={} {}..{}]",
                table, hotel_id, breakfast_included, checkin_date, checkout_date
            ),
        }
    }
}

/// Where a warehouse record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub batch_number: BatchNumber,
    pub row_id: RowId,
}

/// Result of an idempotent warehouse write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    /// The business key was already present; nothing was written
    AlreadyPresent,
}
