use crate::errors::WarehouseError;
use crate::model::{RowStatus, TableName};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Staging row identifier (creation order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub i64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Batch number assigned at ingestion time, always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchNumber(u64);

impl BatchNumber {
    pub fn new(value: u64) -> Result<Self, WarehouseError> {
        if value == 0 {
            return Err(WarehouseError::InvalidBatchNumber {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BatchNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BatchNumber {
    type Err = WarehouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u64>()
            .map_err(|_| WarehouseError::InvalidBatchNumber {
                value: s.to_string(),
            })?;
        Self::new(value)
    }
}

/// Raw field data of a staged row, kept exactly as ingested
///
/// The payload is JSON text. It is not parsed until validation so that a
/// malformed payload becomes a row-level error instead of breaking the
/// selection of a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFields(String);

impl RawFields {
    pub fn from_json_text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn from_value(value: &Value) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a field map; anything but a JSON object is rejected.
    pub fn parse(&self) -> Result<Map<String, Value>, String> {
        match serde_json::from_str::<Value>(&self.0) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err("payload is not a JSON object".to_string()),
            Err(e) => Err(format!("payload is not valid JSON: {}", e)),
        }
    }
}

/// A row in the staging area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingRow {
    pub id: RowId,
    pub batch_number: BatchNumber,
    pub table: TableName,
    pub status: RowStatus,
    pub fields: RawFields,
    /// Last diagnostic recorded by checkout, if any
    pub note: Option<String>,
}
