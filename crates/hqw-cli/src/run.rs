//! One checkout invocation, from parsed arguments to printed report

use crate::args::CommonArgs;
use crate::report::print_report;
use crate::settings::Settings;
use anyhow::{Context, Result};
use hqw_core::logging_facility;
use hqw_core::model::CheckoutReport;
use hqw_core::rules::RuleSet;
use hqw_engine::{apply_checkout_target, CheckoutOptions, EngineCommand};
use hqw_store::SqliteCheckoutStore;

/// Resolve settings, check the command, open the stores and run it.
///
/// # Errors
///
/// Invocation errors (unknown table, missing batch) and setup failures.
/// Arguments are checked before any database is opened, and the staging
/// database must already exist. Row-level failures are part of the
/// returned report instead.
pub fn run(cmd: EngineCommand, args: &CommonArgs) -> Result<(Settings, CheckoutReport)> {
    let settings = Settings::resolve(args)?;
    logging_facility::init(settings.profile);

    let target = cmd.target()?;
    let mut store = SqliteCheckoutStore::open(&settings.staging_db, &settings.warehouse_db)
        .with_context(|| {
            format!(
                "opening staging database {} with warehouse {}",
                settings.staging_db.display(),
                settings.warehouse_db.display()
            )
        })?;
    let rules = RuleSet::new(settings.rules.clone());
    let options = CheckoutOptions::new(settings.as_of);

    let report = apply_checkout_target(target, &mut store, &rules, &options)?;
    Ok((settings, report))
}

/// Entry point shared by both binaries; returns the process exit code.
pub fn execute(cmd: EngineCommand, args: &CommonArgs) -> i32 {
    match run(cmd, args) {
        Ok((settings, report)) => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if let Err(e) = print_report(&mut out, &report, settings.verbose) {
                eprintln!("Error: writing report: {}", e);
                return 1;
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
