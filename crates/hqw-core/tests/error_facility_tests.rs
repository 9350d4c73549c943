use hqw_core::errors::{HqError, HqErrorKind, WarehouseError};
use hqw_core::model::{BatchNumber, RowStatus, TableName};

#[test]
fn test_unknown_table_lists_available_tables() {
    let err = "rates".parse::<TableName>().unwrap_err();
    let hq: HqError = err.into();

    assert_eq!(hq.kind(), HqErrorKind::UnknownTable);
    assert_eq!(hq.code(), "ERR_UNKNOWN_TABLE");
    assert_eq!(hq.table(), Some("rates"));
    assert!(hq.message().contains("Available tables: currency, forex, offer"));
    assert!(hq.is_invocation_error());
}

#[test]
fn test_batch_not_found_carries_batch() {
    let hq: HqError = WarehouseError::BatchNotFound { batch_number: 999 }.into();

    assert_eq!(hq.kind(), HqErrorKind::BatchNotFound);
    assert_eq!(hq.batch_number(), Some(999));
    assert!(hq.is_invocation_error());
    assert!(hq.to_string().contains("(batch: 999)"));
}

#[test]
fn test_invalid_batch_number_is_invalid_input() {
    let hq: HqError = "0".parse::<BatchNumber>().unwrap_err().into();
    assert_eq!(hq.kind(), HqErrorKind::InvalidInput);
    assert!(hq.is_invocation_error());
}

#[test]
fn test_illegal_transition_is_not_invocation_error() {
    let hq: HqError = RowStatus::Ignored
        .check_transition(12, RowStatus::Committed)
        .unwrap_err()
        .into();

    assert_eq!(hq.kind(), HqErrorKind::IllegalTransition);
    assert_eq!(hq.row_id(), Some(12));
    assert!(!hq.is_invocation_error());
}

#[test]
fn test_unknown_status_text() {
    let hq: HqError = "archived".parse::<RowStatus>().unwrap_err().into();
    assert_eq!(hq.code(), "ERR_UNKNOWN_STATUS");
    assert!(hq.message().contains("archived"));
}

#[test]
fn test_status_conflict_names_row_and_expected_status() {
    let hq: HqError = WarehouseError::StatusConflict {
        row_id: 4,
        expected: RowStatus::Pending.to_string(),
    }
    .into();
    assert_eq!(hq.code(), "ERR_STATUS_CONFLICT");
    assert_eq!(hq.row_id(), Some(4));
    assert!(hq.message().contains("no longer pending"));
    assert!(!hq.is_invocation_error());
}
