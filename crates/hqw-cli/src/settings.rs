//! Resolved run settings
//!
//! Precedence for each option: command line, then environment (including a
//! `.env` file in the working directory), then the built-in default.

use crate::args::CommonArgs;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use hqw_core::logging_facility::Profile;
use hqw_core::rules::ValidationConfig;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Settings {
    pub staging_db: PathBuf,
    pub warehouse_db: PathBuf,
    pub rules: ValidationConfig,
    pub as_of: NaiveDate,
    pub profile: Profile,
    pub verbose: bool,
}

impl Settings {
    /// Resolve settings from parsed arguments.
    ///
    /// # Errors
    ///
    /// An unreadable or invalid rules file, or an unsupported log format.
    pub fn resolve(args: &CommonArgs) -> Result<Self> {
        let rules = match &args.rules {
            Some(path) => ValidationConfig::from_file(path)
                .with_context(|| format!("loading rules from {}", path.display()))?,
            None => ValidationConfig::default(),
        };
        let profile = Profile::from_format(&args.log_format)
            .ok_or_else(|| anyhow!("unsupported log format: {}", args.log_format))?;

        Ok(Self {
            staging_db: args.staging_db.clone(),
            warehouse_db: args.warehouse_db.clone(),
            rules,
            as_of: args
                .as_of
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
            profile,
            verbose: args.verbose,
        })
    }
}

/// Load `.env` from the working directory, if there is one
pub fn load_env() {
    dotenvy::dotenv().ok();
}
