//! Row validation
//!
//! A [`Validator`] maps a staged row's raw fields to a [`Verdict`]. It never
//! touches storage: referential checks consult the [`ReferenceData`]
//! snapshot carried by the [`ValidationContext`], so the same row, context
//! and configuration always produce the same verdict.

pub mod config;
mod currency;
pub mod fields;
mod forex;
mod offer;
pub mod reference;

pub use config::{CurrencyRules, ForexRules, OfferRules, ValidationConfig};
pub use reference::ReferenceData;

use crate::model::{RawFields, TableName, WarehouseRecord};
use chrono::NaiveDate;

/// Outcome of validating one row
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Commit as is
    Valid(WarehouseRecord),
    /// Commit, keeping the note for audit
    Questionable(WarehouseRecord, String),
    /// Do not commit; the reason is stored on the staging row
    Invalid(String),
}

impl Verdict {
    pub(crate) fn from_notes(record: WarehouseRecord, notes: Vec<String>) -> Self {
        if notes.is_empty() {
            Verdict::Valid(record)
        } else {
            Verdict::Questionable(record, notes.join("; "))
        }
    }

    pub fn is_committable(&self) -> bool {
        !matches!(self, Verdict::Invalid(_))
    }

    pub fn record(&self) -> Option<&WarehouseRecord> {
        match self {
            Verdict::Valid(record) | Verdict::Questionable(record, _) => Some(record),
            Verdict::Invalid(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Valid(_) => None,
            Verdict::Questionable(_, note) => Some(note),
            Verdict::Invalid(reason) => Some(reason),
        }
    }
}

/// Read-only inputs the rules may consult besides the row itself
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Day the checkout runs; offers ending before it are expired
    pub as_of: NaiveDate,
    pub reference: &'a ReferenceData,
}

impl<'a> ValidationContext<'a> {
    pub fn new(as_of: NaiveDate, reference: &'a ReferenceData) -> Self {
        Self { as_of, reference }
    }
}

/// Decides whether a staged row may enter the warehouse
pub trait Validator {
    fn validate(&self, table: TableName, fields: &RawFields, ctx: &ValidationContext<'_>)
        -> Verdict;
}

/// The per-table rules, driven by a [`ValidationConfig`]
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    config: ValidationConfig,
}

impl RuleSet {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

impl Validator for RuleSet {
    fn validate(
        &self,
        table: TableName,
        fields: &RawFields,
        ctx: &ValidationContext<'_>,
    ) -> Verdict {
        let map = match fields.parse() {
            Ok(map) => map,
            Err(reason) => return Verdict::Invalid(reason),
        };
        match table {
            TableName::Currency => currency::validate(&map, ctx, &self.config.currency),
            TableName::Forex => forex::validate(&map, ctx, &self.config.forex),
            TableName::Offer => offer::validate(&map, ctx, &self.config.offer),
        }
    }
}
