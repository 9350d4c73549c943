use hqw_core_types::RunId;
use thiserror::Error;

/// Result type alias using HqError
pub type Result<T> = std::result::Result<T, HqError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable by scripts wrapping the
/// command line tools and by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HqErrorKind {
    // Invocation
    InvalidInput,
    UnknownTable,
    BatchNotFound,

    // Staging state machine
    NotFound,
    UnknownStatus,
    IllegalTransition,
    StatusConflict,

    // Storage
    ConstraintViolation,
    Persistence,
    Serialization,
    Config,
}

impl HqErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            HqErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            HqErrorKind::UnknownTable => "ERR_UNKNOWN_TABLE",
            HqErrorKind::BatchNotFound => "ERR_BATCH_NOT_FOUND",
            HqErrorKind::NotFound => "ERR_NOT_FOUND",
            HqErrorKind::UnknownStatus => "ERR_UNKNOWN_STATUS",
            HqErrorKind::IllegalTransition => "ERR_ILLEGAL_TRANSITION",
            HqErrorKind::StatusConflict => "ERR_STATUS_CONFLICT",
            HqErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            HqErrorKind::Persistence => "ERR_PERSISTENCE",
            HqErrorKind::Serialization => "ERR_SERIALIZATION",
            HqErrorKind::Config => "ERR_CONFIG",
        }
    }

    /// Whether this kind is a failure of the invocation itself (bad
    /// argument, unknown table, missing batch) rather than of a row.
    pub fn is_invocation(&self) -> bool {
        matches!(
            self,
            HqErrorKind::InvalidInput | HqErrorKind::UnknownTable | HqErrorKind::BatchNotFound
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the context
/// needed to find the offending row or batch.
#[derive(Debug, Clone)]
pub struct HqError {
    kind: HqErrorKind,
    op: Option<String>,
    row_id: Option<i64>,
    batch_number: Option<u64>,
    table: Option<String>,
    run_id: Option<RunId>,
    message: String,
}

impl HqError {
    /// Create a new error with the specified kind
    pub fn new(kind: HqErrorKind) -> Self {
        Self {
            kind,
            op: None,
            row_id: None,
            batch_number: None,
            table: None,
            run_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add staging row context
    pub fn with_row_id(mut self, row_id: i64) -> Self {
        self.row_id = Some(row_id);
        self
    }

    /// Add batch context
    pub fn with_batch(mut self, batch_number: u64) -> Self {
        self.batch_number = Some(batch_number);
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add run context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> HqErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn row_id(&self) -> Option<i64> {
        self.row_id
    }

    pub fn batch_number(&self) -> Option<u64> {
        self.batch_number
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// See [`HqErrorKind::is_invocation`]
    pub fn is_invocation_error(&self) -> bool {
        self.kind.is_invocation()
    }
}

impl std::fmt::Display for HqError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(row_id) = self.row_id {
            write!(f, " (row_id: {})", row_id)?;
        }
        if let Some(batch) = self.batch_number {
            write!(f, " (batch: {})", batch)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        Ok(())
    }
}

impl std::error::Error for HqError {}

// ========== End Error Facility ==========

/// Domain failures raised by the model and the repositories
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarehouseError {
    /// Table name outside the closed set of staged tables
    #[error("No such table to check out: {name}. Available tables: {available}")]
    UnknownTable { name: String, available: String },

    /// Batch number matches no staging row
    #[error("Batch {batch_number} does not exist in the staging area")]
    BatchNotFound { batch_number: u64 },

    /// Batch numbers are positive integers
    #[error("Invalid batch number: {value} (must be a positive integer)")]
    InvalidBatchNumber { value: String },

    /// Status text stored in staging is not one of the known statuses
    #[error("Unknown row status: {value}")]
    UnknownStatus { value: String },

    /// Requested status change is not an edge of the state machine
    #[error("Illegal status transition for row {row_id}: {from} -> {to}")]
    IllegalTransition {
        row_id: i64,
        from: String,
        to: String,
    },

    /// Staging row does not exist
    #[error("Staging row not found: {row_id}")]
    RowNotFound { row_id: i64 },

    /// Row left its expected status before a compare-and-set landed
    #[error("Row {row_id} is no longer {expected}; status changed by another writer")]
    StatusConflict { row_id: i64, expected: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<WarehouseError> for HqError {
    fn from(err: WarehouseError) -> Self {
        let message = err.to_string();
        match err {
            WarehouseError::UnknownTable { name, .. } => HqError::new(HqErrorKind::UnknownTable)
                .with_table(name)
                .with_message(message),
            WarehouseError::BatchNotFound { batch_number } => {
                HqError::new(HqErrorKind::BatchNotFound)
                    .with_batch(batch_number)
                    .with_message(message)
            }
            WarehouseError::InvalidBatchNumber { .. } => {
                HqError::new(HqErrorKind::InvalidInput).with_message(message)
            }
            WarehouseError::UnknownStatus { .. } => {
                HqError::new(HqErrorKind::UnknownStatus).with_message(message)
            }
            WarehouseError::IllegalTransition { row_id, .. } => {
                HqError::new(HqErrorKind::IllegalTransition)
                    .with_row_id(row_id)
                    .with_message(message)
            }
            WarehouseError::RowNotFound { row_id } => HqError::new(HqErrorKind::NotFound)
                .with_row_id(row_id)
                .with_message(message),
            WarehouseError::StatusConflict { row_id, .. } => {
                HqError::new(HqErrorKind::StatusConflict)
                    .with_row_id(row_id)
                    .with_message(message)
            }
            WarehouseError::Config { .. } => {
                HqError::new(HqErrorKind::Config).with_message(message)
            }
        }
    }
}
