use crate::errors::WarehouseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of staged tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Currency,
    Forex,
    Offer,
}

impl TableName {
    /// All tables, in name order
    pub const ALL: [TableName; 3] = [TableName::Currency, TableName::Forex, TableName::Offer];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Currency => "currency",
            TableName::Forex => "forex",
            TableName::Offer => "offer",
        }
    }

    /// Comma separated list of table names, for usage and error messages
    pub fn available() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = WarehouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| WarehouseError::UnknownTable {
                name: s.to_string(),
                available: Self::available(),
            })
    }
}
