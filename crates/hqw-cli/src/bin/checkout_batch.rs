//! hqw-checkout-batch
//!
//! Checks out every row of one staging batch into the warehouse.

use clap::Parser;
use hqw_cli::{execute, settings, BatchArgs};
use hqw_engine::EngineCommand;

fn main() {
    settings::load_env();
    let args = BatchArgs::parse();

    let cmd = EngineCommand::CheckoutBatch {
        batch_number: args.batch_number,
    };
    std::process::exit(execute(cmd, &args.common));
}
