//! HQ warehouse command line tools
//!
//! Shared pieces of `hqw-checkout-batch` and `hqw-checkout-table`:
//! argument structs, settings resolution, the run itself and report
//! printing.

pub mod args;
pub mod report;
pub mod run;
pub mod settings;

pub use args::{BatchArgs, CommonArgs, TableArgs};
pub use run::{execute, run};
