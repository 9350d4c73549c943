//! Checkout report printing

use hqw_core::model::CheckoutReport;
use std::io::{self, Write};

/// Write the outcomes (all when `verbose`, else only failures) followed by
/// the summary line.
pub fn print_report<W: Write>(
    out: &mut W,
    report: &CheckoutReport,
    verbose: bool,
) -> io::Result<()> {
    if verbose {
        for outcome in &report.outcomes {
            writeln!(out, "{}", outcome)?;
        }
    } else {
        for outcome in report.failures() {
            writeln!(out, "{}", outcome)?;
        }
    }
    writeln!(out, "Checkout {}: {}", report.run_id, report.summary)
}
