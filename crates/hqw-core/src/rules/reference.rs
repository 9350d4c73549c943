//! Read-only reference data consulted by the referential rules

use crate::model::{CurrencyCode, WarehouseRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Currencies known to the warehouse and their dated rates to USD
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    currencies: BTreeSet<CurrencyCode>,
    usd_rates: BTreeMap<CurrencyCode, BTreeMap<NaiveDate, Decimal>>,
}

impl ReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_currency(&mut self, code: CurrencyCode) {
        self.currencies.insert(code);
    }

    /// Record the rate converting one unit of `from` into US dollars
    pub fn add_usd_rate(&mut self, from: CurrencyCode, date: NaiveDate, rate: Decimal) {
        self.usd_rates.entry(from).or_default().insert(date, rate);
    }

    pub fn knows(&self, code: &CurrencyCode) -> bool {
        self.currencies.contains(code)
    }

    pub fn currency_count(&self) -> usize {
        self.currencies.len()
    }

    /// Most recent rate to USD dated on or before `date`. USD converts at 1.
    pub fn usd_rate_on_or_before(&self, code: &CurrencyCode, date: NaiveDate) -> Option<Decimal> {
        if *code == CurrencyCode::usd() {
            return Some(Decimal::ONE);
        }
        self.usd_rates
            .get(code)?
            .range(..=date)
            .next_back()
            .map(|(_, rate)| *rate)
    }

    /// Fold a freshly committed record in, so later rows of the same run can
    /// refer to it.
    pub fn absorb(&mut self, record: &WarehouseRecord) {
        match record {
            WarehouseRecord::Currency(c) => self.add_currency(c.code.clone()),
            WarehouseRecord::Forex(f) if f.currency_to == CurrencyCode::usd() => {
                self.add_usd_rate(f.currency_from.clone(), f.date_valid, f.rate)
            }
            _ => {}
        }
    }
}
