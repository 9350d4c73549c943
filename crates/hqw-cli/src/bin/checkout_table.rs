//! hqw-checkout-table
//!
//! Checks out the error rows of one table into the warehouse.

use clap::Parser;
use hqw_cli::{execute, settings, TableArgs};
use hqw_engine::EngineCommand;

fn main() {
    settings::load_env();
    let args = TableArgs::parse();

    let cmd = EngineCommand::CheckoutTable { table: args.table };
    std::process::exit(execute(cmd, &args.common));
}
