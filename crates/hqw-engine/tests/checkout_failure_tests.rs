#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use hqw_core::errors::HqErrorKind;
use hqw_core::model::{Decision, RowStatus, TableName};
use hqw_core::repository::{MemoryStaging, MemoryStore, MemoryWarehouse, StagingRepository};
use hqw_core::rules::RuleSet;
use hqw_engine::{checkout_batch, checkout_table, run_checkout};

#[test]
fn test_warehouse_failure_leaves_row_in_prior_status() {
    let (store, ids) = memory_fixture();
    let mut store = MemoryStore::new(
        store.staging,
        FailingWarehouse {
            inner: store.warehouse,
            fail_row: ids[2],
            fail_reference: false,
        },
    );

    let report = checkout_batch(batch(3), &mut store, &RuleSet::default(), &options()).unwrap();

    let failed = &report.outcomes[2];
    assert_eq!(failed.decision, Decision::Errored);
    assert!(failed.message.as_deref().unwrap().contains("disk I/O error"));
    assert_eq!(store.staging.current_status(ids[2]).unwrap(), Some(RowStatus::Pending));
    assert!(!store.in_unit());

    // Later rows still ran
    assert_eq!(report.outcomes[4].decision, Decision::Committed);
    assert_eq!(report.summary.committed, 3);
    assert_eq!(report.summary.errored, 2);
}

#[test]
fn test_failed_status_change_rolls_back_warehouse_write() {
    let (store, ids) = memory_fixture();
    let mut store = MemoryStore::new(
        UnwritableStaging {
            inner: store.staging,
            stuck_row: ids[2],
        },
        store.warehouse,
    );
    let before = store.warehouse.len();

    let report = checkout_batch(batch(3), &mut store, &RuleSet::default(), &options()).unwrap();

    let failed = &report.outcomes[2];
    assert_eq!(failed.decision, Decision::Errored);
    assert!(failed.message.as_deref().unwrap().contains("disk is full"));
    assert_eq!(store.staging.current_status(ids[2]).unwrap(), Some(RowStatus::Pending));
    assert!(store
        .warehouse
        .records()
        .all(|stored| stored.origin.row_id != ids[2]));
    // Currency, first forex and questionable forex still committed
    assert_eq!(store.warehouse.len(), before + 3);
    assert_eq!(report.summary.committed, 3);
}

#[test]
fn test_error_row_keeps_no_record_when_retry_cannot_commit() {
    let (mut store, ids) = memory_fixture();
    let rules = RuleSet::default();
    checkout_batch(batch(3), &mut store, &rules, &options()).unwrap();
    store.staging.edit_fields(ids[3], fields(offer_payload(18))).unwrap();

    let mut store = MemoryStore::new(
        UnwritableStaging {
            inner: store.staging,
            stuck_row: ids[3],
        },
        store.warehouse,
    );
    let report = checkout_table(TableName::Offer, &mut store, &rules, &options()).unwrap();

    assert_eq!(report.outcomes[0].decision, Decision::Errored);
    assert_eq!(store.staging.current_status(ids[3]).unwrap(), Some(RowStatus::Error));
    assert!(store
        .warehouse
        .records()
        .all(|stored| stored.origin.row_id != ids[3]));
}

#[test]
fn test_failed_row_is_picked_up_by_the_next_batch_run() {
    let (store, ids) = memory_fixture();
    let mut failing = MemoryStore::new(
        store.staging,
        FailingWarehouse {
            inner: store.warehouse,
            fail_row: ids[2],
            fail_reference: false,
        },
    );
    let rules = RuleSet::default();
    checkout_batch(batch(3), &mut failing, &rules, &options()).unwrap();

    let mut store = MemoryStore::new(failing.staging, failing.warehouse.inner);
    let report = checkout_batch(batch(3), &mut store, &rules, &options()).unwrap();

    assert_eq!(report.outcomes[2].decision, Decision::Committed);
    assert_eq!(store.staging.current_status(ids[2]).unwrap(), Some(RowStatus::Committed));
}

#[test]
fn test_reference_load_failure_aborts_before_any_row() {
    let (store, ids) = memory_fixture();
    let mut store = MemoryStore::new(
        store.staging,
        FailingWarehouse {
            inner: store.warehouse,
            fail_row: ids[0],
            fail_reference: true,
        },
    );

    let err = checkout_batch(batch(3), &mut store, &RuleSet::default(), &options()).unwrap_err();

    assert_eq!(err.kind(), HqErrorKind::Persistence);
    assert_eq!(err.op(), Some("load_reference_data"));
    assert!(!err.is_invocation_error());
    for id in ids {
        assert_eq!(store.staging.current_status(id).unwrap(), Some(RowStatus::Pending));
    }
}

#[test]
fn test_lost_status_race_is_reported_and_row_left_alone() {
    let (store, ids) = memory_fixture();
    let mut store = MemoryStore::new(
        RacingStaging {
            inner: store.staging,
            contested_row: ids[3],
        },
        store.warehouse,
    );

    let report = checkout_batch(batch(3), &mut store, &RuleSet::default(), &options()).unwrap();

    let contested = &report.outcomes[3];
    assert_eq!(contested.decision, Decision::Errored);
    let message = contested.message.as_deref().unwrap();
    assert!(message.contains("ERR_STATUS_CONFLICT"));
    assert!(message.contains("another writer"));
    assert_eq!(
        store.staging.current_status(ids[3]).unwrap(),
        Some(RowStatus::Committed)
    );
    assert_eq!(report.summary.committed, 4);
}

#[test]
fn test_lost_race_on_valid_row_writes_nothing() {
    let (store, ids) = memory_fixture();
    let mut store = MemoryStore::new(
        RacingStaging {
            inner: store.staging,
            contested_row: ids[2],
        },
        store.warehouse,
    );

    let report = checkout_batch(batch(3), &mut store, &RuleSet::default(), &options()).unwrap();

    assert_eq!(report.outcomes[2].decision, Decision::Errored);
    assert!(store
        .warehouse
        .records()
        .all(|stored| stored.origin.row_id != ids[2]));
}

#[test]
fn test_duplicate_candidates_are_processed_once() {
    let mut staging = MemoryStaging::new();
    let mut warehouse = MemoryWarehouse::new();
    seed_warehouse(&mut warehouse);
    let ids = stage_memory(&mut staging, 5, vec![(TableName::Offer, offer_payload(40))]);
    let row = staging.row(ids[0]).unwrap().clone();
    let mut store = MemoryStore::new(staging, warehouse);

    let report = run_checkout(vec![row.clone(), row], &mut store, &RuleSet::default(), &options())
        .unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.summary.committed, 1);
}

#[test]
fn test_same_business_key_twice_commits_both_rows_once_in_warehouse() {
    let mut staging = MemoryStaging::new();
    let mut warehouse = MemoryWarehouse::new();
    seed_warehouse(&mut warehouse);
    stage_memory(
        &mut staging,
        6,
        vec![
            (TableName::Offer, offer_payload(50)),
            (TableName::Offer, offer_payload(50)),
        ],
    );
    let before = warehouse.len();
    let mut store = MemoryStore::new(staging, warehouse);

    let report = checkout_batch(batch(6), &mut store, &RuleSet::default(), &options()).unwrap();

    assert_eq!(report.summary.committed, 2);
    assert_eq!(store.warehouse.len(), before + 1);
}
