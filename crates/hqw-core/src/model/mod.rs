//! Domain model: staged rows, their lifecycle, and the warehouse records
//! they turn into.

pub mod outcome;
pub mod record;
pub mod row;
pub mod status;
pub mod table;

pub use outcome::{CheckoutOutcome, CheckoutReport, Decision, RunSummary};
pub use record::{
    BusinessKey, CurrencyCode, CurrencyRecord, ForexRecord, OfferLifecycle, OfferRecord, Origin,
    WarehouseRecord, WarehouseTable, WriteOutcome,
};
pub use row::{BatchNumber, RawFields, RowId, StagingRow};
pub use status::RowStatus;
pub use table::TableName;
