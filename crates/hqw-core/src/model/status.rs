use crate::errors::WarehouseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a staging row
///
/// Legal transitions:
///
/// ```text
/// pending -> committed | error
/// error   -> committed | error
/// any     -> ignored            (set by operators, never by checkout)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Pending,
    Committed,
    Error,
    Ignored,
}

impl RowStatus {
    pub const ALL: [RowStatus; 4] = [
        RowStatus::Pending,
        RowStatus::Committed,
        RowStatus::Error,
        RowStatus::Ignored,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Pending => "pending",
            RowStatus::Committed => "committed",
            RowStatus::Error => "error",
            RowStatus::Ignored => "ignored",
        }
    }

    /// Whether `self -> next` is an edge of the state machine.
    ///
    /// `error -> error` is allowed so a re-validation can refresh the stored
    /// diagnostic.
    pub fn can_transition_to(self, next: RowStatus) -> bool {
        use RowStatus::*;
        match (self, next) {
            (_, Ignored) => true,
            (Pending, Committed) | (Pending, Error) => true,
            (Error, Committed) | (Error, Error) => true,
            _ => false,
        }
    }

    /// Check an edge, producing the domain error for illegal ones
    pub fn check_transition(self, row_id: i64, next: RowStatus) -> Result<(), WarehouseError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(WarehouseError::IllegalTransition {
                row_id,
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowStatus {
    type Err = WarehouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| WarehouseError::UnknownStatus {
                value: s.to_string(),
            })
    }
}
