//! Tolerances of the per-table rule sets
//!
//! Loaded from TOML; every section and key is optional.
//!
//! ```toml
//! [forex]
//! rate_min = 0.001
//! rate_max = 5000
//! max_future_days = 3
//! ```

use crate::errors::WarehouseError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Width of the warehouse `currencies.name` column
pub const NAME_COLUMN_WIDTH: usize = 64;

/// Upper bound for `forex.max_future_days` (about a century)
pub const MAX_FUTURE_DAYS_LIMIT: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    pub currency: CurrencyRules,
    pub forex: ForexRules,
    pub offer: OfferRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurrencyRules {
    /// Longest accepted currency name (warehouse column width)
    pub name_max_len: usize,
    pub usd_rate_min: Decimal,
    pub usd_rate_max: Decimal,
}

impl Default for CurrencyRules {
    fn default() -> Self {
        Self {
            name_max_len: NAME_COLUMN_WIDTH,
            usd_rate_min: Decimal::new(1, 4),
            usd_rate_max: Decimal::new(100_000, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForexRules {
    pub rate_min: Decimal,
    pub rate_max: Decimal,
    /// Rates dated further ahead than this are questionable
    pub max_future_days: i64,
}

impl Default for ForexRules {
    fn default() -> Self {
        Self {
            rate_min: Decimal::new(1, 4),
            rate_max: Decimal::new(100_000, 0),
            max_future_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OfferRules {
    pub price_usd_max: Decimal,
}

impl Default for OfferRules {
    fn default() -> Self {
        Self {
            price_usd_max: Decimal::new(100_000, 0),
        }
    }
}

impl ValidationConfig {
    /// Parse and sanity-check a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, WarehouseError> {
        let config: ValidationConfig =
            toml::from_str(text).map_err(|e| WarehouseError::Config {
                message: format!("invalid rules file: {}", e),
            })?;
        config.check()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, WarehouseError> {
        let text = std::fs::read_to_string(path).map_err(|e| WarehouseError::Config {
            message: format!("cannot read rules file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }

    fn check(&self) -> Result<(), WarehouseError> {
        let bands = [
            ("currency.usd_rate", self.currency.usd_rate_min, self.currency.usd_rate_max),
            ("forex.rate", self.forex.rate_min, self.forex.rate_max),
        ];
        for (name, min, max) in bands {
            if min <= Decimal::ZERO || min > max {
                return Err(WarehouseError::Config {
                    message: format!(
                        "{name}_min must be positive and not above {name}_max (got {min} > {max})"
                    ),
                });
            }
        }
        if !(0..=MAX_FUTURE_DAYS_LIMIT).contains(&self.forex.max_future_days) {
            return Err(WarehouseError::Config {
                message: format!(
                    "forex.max_future_days must be between 0 and {}, got {}",
                    MAX_FUTURE_DAYS_LIMIT, self.forex.max_future_days
                ),
            });
        }
        if self.currency.name_max_len == 0 || self.currency.name_max_len > NAME_COLUMN_WIDTH {
            return Err(WarehouseError::Config {
                message: format!(
                    "currency.name_max_len must be between 1 and {}",
                    NAME_COLUMN_WIDTH
                ),
            });
        }
        Ok(())
    }
}
