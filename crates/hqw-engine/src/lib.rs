//! HQ warehouse engine - checkout orchestration
//!
//! Coordinates the validator with a checkout store (staging plus warehouse).
//! Batch and table checkout differ only in how candidate rows are selected.

pub mod commands;

pub use commands::batch::checkout_batch;
pub use commands::checkout::{run_checkout, CheckoutOptions};
pub use commands::engine_command::{
    apply_checkout_target, apply_engine_command, CheckoutTarget, EngineCommand,
};
pub use commands::table::checkout_table;
