//! Command line arguments

use chrono::NaiveDate;
use clap::{Args, Parser};
use std::path::PathBuf;

/// Options shared by both checkout tools
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Print every row outcome, not only failures
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Staging database file
    #[arg(long, env = "HQW_STAGING_DB", default_value = "hq_stage.db")]
    pub staging_db: PathBuf,

    /// Warehouse database file
    #[arg(long, env = "HQW_WAREHOUSE_DB", default_value = "hq_warehouse.db")]
    pub warehouse_db: PathBuf,

    /// TOML file overriding the validation tolerances
    #[arg(long, env = "HQW_RULES")]
    pub rules: Option<PathBuf>,

    /// Evaluation date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Log output format on stderr
    #[arg(long, env = "HQW_LOG_FORMAT", default_value = "text", value_parser = ["text", "json"])]
    pub log_format: String,
}

/// Move the staging rows of one batch into the warehouse
#[derive(Debug, Parser)]
#[command(name = "hqw-checkout-batch", version)]
#[command(
    about = "Check out all rows of a staging batch into the warehouse",
    long_about = "Check out all rows of a staging batch into the warehouse.\n\n\
                  Rows that fail validation are marked as errors in the staging area; \
                  rows loaded before are ignored."
)]
pub struct BatchArgs {
    /// Batch number to check out
    #[arg(short = 'b', long = "batch", value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_number: u64,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Retry the error rows of one staged table
#[derive(Debug, Parser)]
#[command(name = "hqw-checkout-table", version)]
#[command(
    about = "Check out the error rows of one table into the warehouse",
    long_about = "Check out the error rows of one table into the warehouse.\n\n\
                  Meant to be run after correcting rows by hand; rows marked for ignore \
                  are left alone. Available tables: currency, forex, offer."
)]
pub struct TableArgs {
    /// Table to check out (currency, forex or offer)
    #[arg(short = 't', long = "table")]
    pub table: String,

    #[command(flatten)]
    pub common: CommonArgs,
}
