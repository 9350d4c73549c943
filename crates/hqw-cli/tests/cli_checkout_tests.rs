//! CLI integration tests
//!
//! Run the built binaries against staging and warehouse files in a
//! temporary directory.

use hqw_core::model::{
    BatchNumber, CurrencyCode, CurrencyRecord, ForexRecord, Origin, RawFields, RowId, RowStatus,
    TableName, WarehouseRecord,
};
use hqw_core::repository::{StagingRepository, WarehouseRepository};
use hqw_store::{SqliteStagingRepo, SqliteWarehouseRepo};
use serde_json::json;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const BATCH_BIN: &str = env!("CARGO_BIN_EXE_hqw-checkout-batch");
const TABLE_BIN: &str = env!("CARGO_BIN_EXE_hqw-checkout-table");

fn offer(hotel_id: u32, currency: Option<&str>) -> RawFields {
    let mut value = json!({
        "hotel_id": hotel_id,
        "original_price": "100.00",
        "breakfast_included": "t",
        "valid_from": "2016-03-01 00:00:00",
        "valid_to": "2016-03-20 12:00:00",
        "checkin_date": "2016-04-01",
        "checkout_date": "2016-04-03"
    });
    if let Some(code) = currency {
        value["original_currency"] = json!(code);
    }
    RawFields::from_value(&value)
}

/// Seeded warehouse plus batch 3 (three valid rows, one offer without a
/// currency, one questionable forex rate). Returns the staged row ids.
fn setup(dir: &TempDir) -> Vec<RowId> {
    let mut warehouse = SqliteWarehouseRepo::open(dir.path().join("hq_warehouse.db")).unwrap();
    let code = |s: &str| CurrencyCode::parse(s).unwrap();
    let seed = [
        WarehouseRecord::Currency(CurrencyRecord {
            code: code("USD"),
            name: "US dollar".to_string(),
            usd_rate: None,
        }),
        WarehouseRecord::Currency(CurrencyRecord {
            code: code("EUR"),
            name: "Euro".to_string(),
            usd_rate: None,
        }),
        WarehouseRecord::Forex(ForexRecord {
            currency_from: code("EUR"),
            currency_to: code("USD"),
            date_valid: chrono::NaiveDate::from_ymd_opt(2016, 2, 1).unwrap(),
            rate: "1.1".parse().unwrap(),
        }),
    ];
    for (i, record) in seed.iter().enumerate() {
        let origin = Origin {
            batch_number: BatchNumber::new(1).unwrap(),
            row_id: RowId(i as i64 + 1),
        };
        warehouse.upsert(origin, record, None).unwrap();
    }

    let staging = SqliteStagingRepo::open(dir.path().join("hq_stage.db")).unwrap();
    let batch = BatchNumber::new(3).unwrap();
    let rows = [
        (
            TableName::Currency,
            RawFields::from_value(&json!({"code": "GBP", "name": "Pound sterling"})),
        ),
        (
            TableName::Forex,
            RawFields::from_value(
                &json!({"currency_from": "GBP", "currency_to": "USD", "date_valid": "2016-02-28", "rate": "1.42"}),
            ),
        ),
        (TableName::Offer, offer(17, Some("EUR"))),
        (TableName::Offer, offer(18, None)),
        (
            TableName::Forex,
            RawFields::from_value(
                &json!({"currency_from": "GBP", "currency_to": "EUR", "date_valid": "2016-02-28", "rate": "100000.5"}),
            ),
        ),
    ];
    rows.iter()
        .map(|(table, fields)| staging.insert_row(batch, *table, fields).unwrap())
        .collect()
}

fn run(bin: &str, dir: &Path, args: &[&str]) -> Output {
    Command::new(bin)
        .current_dir(dir)
        .env_remove("HQW_STAGING_DB")
        .env_remove("HQW_WAREHOUSE_DB")
        .env_remove("HQW_RULES")
        .env_remove("HQW_LOG_FORMAT")
        .env("RUST_LOG", "off")
        .args(args)
        .args(["--as-of", "2016-03-01"])
        .output()
        .expect("Failed to execute CLI")
}

fn statuses(dir: &Path) -> Vec<RowStatus> {
    let staging = SqliteStagingRepo::open(dir.join("hq_stage.db")).unwrap();
    staging
        .rows_for_batch(BatchNumber::new(3).unwrap())
        .unwrap()
        .into_iter()
        .map(|r| r.status)
        .collect()
}

#[test]
fn test_batch_checkout_scenario() {
    let dir = TempDir::new().unwrap();
    setup(&dir);

    let output = run(BATCH_BIN, dir.path(), &["-b", "3"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "stdout: {}", stdout);
    assert!(lines[0].contains("errored"));
    assert!(lines[0].contains("original_currency"));
    assert!(lines[1].contains("4 committed (1 questionable), 1 errored, 0 ignored"));

    use RowStatus::*;
    assert_eq!(
        statuses(dir.path()),
        vec![Committed, Committed, Committed, Error, Committed]
    );
}

#[test]
fn test_verbose_prints_every_row() {
    let dir = TempDir::new().unwrap();
    setup(&dir);

    let output = run(BATCH_BIN, dir.path(), &["-b", "3", "-v"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 6);
}

#[test]
fn test_missing_batch_exits_non_zero_and_touches_nothing() {
    let dir = TempDir::new().unwrap();
    setup(&dir);

    let output = run(BATCH_BIN, dir.path(), &["-b", "999"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Batch 999 does not exist"));
    assert!(statuses(dir.path()).iter().all(|s| *s == RowStatus::Pending));
}

#[test]
fn test_correction_then_table_checkout() {
    let dir = TempDir::new().unwrap();
    let ids = setup(&dir);
    assert!(run(BATCH_BIN, dir.path(), &["-b", "3"]).status.success());

    let staging = SqliteStagingRepo::open(dir.path().join("hq_stage.db")).unwrap();
    staging.update_payload(ids[3], &offer(18, Some("EUR"))).unwrap();
    drop(staging);

    let output = run(TABLE_BIN, dir.path(), &["-t", "offer"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout)
        .contains("1 committed (0 questionable), 0 errored, 0 ignored"));
    assert!(statuses(dir.path()).iter().all(|s| *s == RowStatus::Committed));
}

#[test]
fn test_unknown_table_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    setup(&dir);

    let output = run(TABLE_BIN, dir.path(), &["-t", "bogus"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No such table to check out: bogus"));
    assert!(stderr.contains("currency, forex, offer"));
    assert!(statuses(dir.path()).iter().all(|s| *s == RowStatus::Pending));
}

#[test]
fn test_unknown_table_creates_no_database() {
    let dir = TempDir::new().unwrap();

    let output = run(TABLE_BIN, dir.path(), &["-t", "bogus"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No such table to check out"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_invocation_error_is_printed_once_with_logging_on() {
    let dir = TempDir::new().unwrap();
    setup(&dir);

    let output = Command::new(TABLE_BIN)
        .current_dir(dir.path())
        .env_remove("HQW_STAGING_DB")
        .env_remove("HQW_WAREHOUSE_DB")
        .env_remove("HQW_RULES")
        .env_remove("HQW_LOG_FORMAT")
        .env("RUST_LOG", "debug")
        .args(["-t", "bogus"])
        .output()
        .expect("Failed to execute CLI");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("No such table to check out: bogus").count(), 1);
}

#[test]
fn test_missing_staging_database_is_setup_error() {
    let dir = TempDir::new().unwrap();
    setup(&dir);

    let output = run(BATCH_BIN, dir.path(), &["-b", "3", "--staging-db", "typo.db"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("typo.db"));
    assert!(!dir.path().join("typo.db").exists());
    assert!(statuses(dir.path()).iter().all(|s| *s == RowStatus::Pending));
}

#[test]
fn test_missing_required_flag_is_usage_error() {
    let dir = TempDir::new().unwrap();

    let output = Command::new(BATCH_BIN)
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute CLI");

    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("hq_stage.db").exists());
}

#[test]
fn test_help_exits_before_processing() {
    let dir = TempDir::new().unwrap();

    let output = Command::new(TABLE_BIN)
        .current_dir(dir.path())
        .arg("-h")
        .output()
        .expect("Failed to execute CLI");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--table"));
    assert!(!dir.path().join("hq_stage.db").exists());
}

#[test]
fn test_database_paths_from_dotenv() {
    let dir = TempDir::new().unwrap();
    setup(&dir);
    std::fs::create_dir(dir.path().join("run")).unwrap();
    std::fs::write(
        dir.path().join("run/.env"),
        "HQW_STAGING_DB=../hq_stage.db\nHQW_WAREHOUSE_DB=../hq_warehouse.db\n",
    )
    .unwrap();

    let output = run(BATCH_BIN, &dir.path().join("run"), &["-b", "3"]);

    assert!(output.status.success());
    assert_eq!(statuses(dir.path())[0], RowStatus::Committed);
}
