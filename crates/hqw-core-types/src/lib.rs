//! Core types shared across the warehouse checkout crates
//!
//! - **Correlation types**: RunId, tagging every event of one checkout run
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RunId;
