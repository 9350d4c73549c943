use crate::model::{RowId, TableName};
use hqw_core_types::RunId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What checkout decided for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Committed,
    Errored,
    Ignored,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Committed => "committed",
            Decision::Errored => "errored",
            Decision::Ignored => "ignored",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-row result of one checkout run; never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutOutcome {
    pub row_id: RowId,
    pub table: TableName,
    pub decision: Decision,
    /// Validator reason, questionable audit note, or storage failure
    pub message: Option<String>,
    /// Committed with a questionable-data note
    pub questionable: bool,
}

impl CheckoutOutcome {
    pub fn committed(row_id: RowId, table: TableName, audit_note: Option<String>) -> Self {
        Self {
            row_id,
            table,
            decision: Decision::Committed,
            questionable: audit_note.is_some(),
            message: audit_note,
        }
    }

    pub fn errored(row_id: RowId, table: TableName, reason: impl Into<String>) -> Self {
        Self {
            row_id,
            table,
            decision: Decision::Errored,
            message: Some(reason.into()),
            questionable: false,
        }
    }

    pub fn ignored(row_id: RowId, table: TableName, reason: impl Into<String>) -> Self {
        Self {
            row_id,
            table,
            decision: Decision::Ignored,
            message: Some(reason.into()),
            questionable: false,
        }
    }
}

impl fmt::Display for CheckoutOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} [{}] {}", self.row_id, self.table, self.decision)?;
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

/// Aggregate counts of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub committed: usize,
    pub errored: usize,
    pub ignored: usize,
    /// Subset of `committed` carrying a questionable-data note
    pub questionable: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &CheckoutOutcome) {
        match outcome.decision {
            Decision::Committed => {
                self.committed += 1;
                if outcome.questionable {
                    self.questionable += 1;
                }
            }
            Decision::Errored => self.errored += 1,
            Decision::Ignored => self.ignored += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.committed + self.errored + self.ignored
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} committed ({} questionable), {} errored, {} ignored",
            self.committed, self.questionable, self.errored, self.ignored
        )
    }
}

/// Ordered outcomes of a run plus their summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutReport {
    pub run_id: RunId,
    pub outcomes: Vec<CheckoutOutcome>,
    pub summary: RunSummary,
}

impl CheckoutReport {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            outcomes: Vec::new(),
            summary: RunSummary::default(),
        }
    }

    pub fn push(&mut self, outcome: CheckoutOutcome) {
        self.summary.record(&outcome);
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckoutOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.decision == Decision::Errored)
    }
}
