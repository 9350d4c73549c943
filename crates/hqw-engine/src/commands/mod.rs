//! Command orchestration layer.
//!
//! `checkout` holds the per-row algorithm; `batch` and `table` select the
//! candidates; `engine_command` dispatches either from a single entry point.

pub mod batch;
pub mod checkout;
pub mod engine_command;
pub mod table;
