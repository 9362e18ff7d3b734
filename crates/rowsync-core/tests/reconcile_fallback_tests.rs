//! Conservative Fallback and Rejection Tests
//!
//! The reconciler prefers a provably correct full reload over clever
//! incremental math, and rejects transactions whose indices contradict the
//! snapshot instead of guessing.

#![allow(clippy::unwrap_used)]

mod common;

use common::{item, snapshot_of, texts_of};
use rowsync_core::{reconcile, ChangeEvent, RowSyncError, Transaction, ViewOperation};
use rowsync_core_types::{IndexPath, SectionKey, TransactionId};

fn txn(events: Vec<ChangeEvent>) -> Transaction {
    Transaction::new(TransactionId::new(), events)
}

#[test]
fn test_cross_section_move_collapses_to_full_reload() {
    // GIVEN two sections
    let snap = snapshot_of(&[&["A", "B"], &["C"]]);

    // WHEN an item moves between sections
    let outcome = reconcile(
        &snap,
        &txn(vec![ChangeEvent::MoveItem {
            from: IndexPath::new(0, 1),
            to: IndexPath::new(1, 0),
        }]),
    )
    .unwrap();

    // THEN the whole batch collapses to one FullReload, and the advanced
    // snapshot still reflects the move
    assert!(outcome.is_full_reload());
    assert_eq!(outcome.operations, vec![ViewOperation::FullReload]);
    assert_eq!(texts_of(&outcome.snapshot), vec![vec!["A"], vec!["B", "C"]]);
}

#[test]
fn test_section_delete_plus_insert_collapses_to_full_reload() {
    // A deleted section and an inserted section in one transaction cannot
    // be proven distinct from a re-insertion at a new index
    let snap = snapshot_of(&[&["A"], &["B"]]);

    let outcome = reconcile(
        &snap,
        &txn(vec![
            ChangeEvent::DeleteSection { index: 1 },
            ChangeEvent::InsertSection {
                index: 0,
                key: SectionKey::from_string("fresh".to_string()),
            },
        ]),
    )
    .unwrap();

    assert!(outcome.is_full_reload());
    assert_eq!(outcome.snapshot.section_count(), 2);
    assert!(outcome.snapshot.sections[0].is_empty());
    assert_eq!(texts_of(&outcome.snapshot)[1], vec!["A"]);
}

#[test]
fn test_full_reload_outcome_carries_no_updated_items() {
    let snap = snapshot_of(&[&["A", "B"], &["C"]]);

    let outcome = reconcile(
        &snap,
        &txn(vec![
            ChangeEvent::UpdateItem {
                path: IndexPath::new(1, 0),
                item: item("C2"),
            },
            ChangeEvent::MoveItem {
                from: IndexPath::new(0, 0),
                to: IndexPath::new(1, 1),
            },
        ]),
    )
    .unwrap();

    // the update still lands in the snapshot; the reload re-renders it
    assert!(outcome.is_full_reload());
    assert!(outcome.updated_items.is_empty());
    assert_eq!(texts_of(&outcome.snapshot), vec![vec!["B"], vec!["C2", "A"]]);
}

#[test]
fn test_stale_section_index_is_rejected() {
    let snap = snapshot_of(&[&["A"]]);

    let result = reconcile(
        &snap,
        &txn(vec![ChangeEvent::DeleteSection { index: 4 }]),
    );

    assert!(matches!(
        result,
        Err(RowSyncError::StaleSectionIndex {
            section: 4,
            bound: 1,
            ..
        })
    ));
}

#[test]
fn test_stale_item_index_is_rejected_without_partial_output() {
    let snap = snapshot_of(&[&["A", "B"]]);

    // one valid delete plus one stale delete: nothing is salvaged
    let result = reconcile(
        &snap,
        &txn(vec![
            ChangeEvent::DeleteItem {
                path: IndexPath::new(0, 0),
            },
            ChangeEvent::DeleteItem {
                path: IndexPath::new(0, 7),
            },
        ]),
    );

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        RowSyncError::StaleItemIndex {
            item: 7,
            bound: 2,
            ..
        }
    ));
    assert!(!err.is_fatal());
}

#[test]
fn test_insert_past_final_length_is_rejected() {
    // ["A"] plus one insert yields two rows, so index 2 has no slot
    let snap = snapshot_of(&[&["A"]]);

    let result = reconcile(
        &snap,
        &txn(vec![ChangeEvent::InsertItem {
            path: IndexPath::new(0, 2),
            item: item("X"),
        }]),
    );

    assert!(matches!(
        result,
        Err(RowSyncError::StaleItemIndex { item: 2, bound: 2, .. })
    ));
}

#[test]
fn test_conflicting_insert_positions_are_rejected() {
    let snap = snapshot_of(&[&["A"]]);

    let result = reconcile(
        &snap,
        &txn(vec![
            ChangeEvent::InsertItem {
                path: IndexPath::new(0, 0),
                item: item("X"),
            },
            ChangeEvent::InsertItem {
                path: IndexPath::new(0, 0),
                item: item("Y"),
            },
        ]),
    );

    assert!(matches!(
        result,
        Err(RowSyncError::ConflictingIndexClaim { section: 0, index: 0, .. })
    ));
}

#[test]
fn test_conflicting_section_inserts_are_rejected() {
    let snap = snapshot_of(&[&["A"]]);

    let result = reconcile(
        &snap,
        &txn(vec![
            ChangeEvent::InsertSection {
                index: 1,
                key: SectionKey::from_string("one".to_string()),
            },
            ChangeEvent::InsertSection {
                index: 1,
                key: SectionKey::from_string("two".to_string()),
            },
        ]),
    );

    assert!(matches!(
        result,
        Err(RowSyncError::ConflictingIndexClaim { index: 1, .. })
    ));
}

#[test]
fn test_row_events_in_deleted_section_are_dropped() {
    // GIVEN a section being deleted in the same transaction as row changes
    // inside it
    let snap = snapshot_of(&[&["A", "B"], &["C"]]);

    let outcome = reconcile(
        &snap,
        &txn(vec![
            ChangeEvent::DeleteItem {
                path: IndexPath::new(0, 0),
            },
            ChangeEvent::UpdateItem {
                path: IndexPath::new(0, 1),
                item: item("B2"),
            },
            ChangeEvent::DeleteSection { index: 0 },
        ]),
    )
    .unwrap();

    // THEN only the section delete survives
    assert_eq!(outcome.operations, vec![ViewOperation::DeleteSection(0)]);
    assert_eq!(texts_of(&outcome.snapshot), vec![vec!["C"]]);
}

#[test]
fn test_duplicate_row_deletes_collapse() {
    // the same row reported deleted twice is one delete, not a conflict
    let snap = snapshot_of(&[&["A", "B"]]);

    let outcome = reconcile(
        &snap,
        &txn(vec![
            ChangeEvent::DeleteItem {
                path: IndexPath::new(0, 1),
            },
            ChangeEvent::DeleteItem {
                path: IndexPath::new(0, 1),
            },
        ]),
    )
    .unwrap();

    assert_eq!(
        outcome.operations,
        vec![ViewOperation::DeleteItem(IndexPath::new(0, 1))]
    );
    assert_eq!(texts_of(&outcome.snapshot), vec![vec!["A"]]);
}

#[test]
fn test_delete_wins_over_move_and_update_of_same_row() {
    let snap = snapshot_of(&[&["A", "B", "C"]]);

    let outcome = reconcile(
        &snap,
        &txn(vec![
            ChangeEvent::UpdateItem {
                path: IndexPath::new(0, 1),
                item: item("B2"),
            },
            ChangeEvent::MoveItem {
                from: IndexPath::new(0, 1),
                to: IndexPath::new(0, 2),
            },
            ChangeEvent::DeleteItem {
                path: IndexPath::new(0, 1),
            },
        ]),
    )
    .unwrap();

    assert_eq!(
        outcome.operations,
        vec![ViewOperation::DeleteItem(IndexPath::new(0, 1))]
    );
    assert!(outcome.updated_items.is_empty());
    assert_eq!(texts_of(&outcome.snapshot), vec![vec!["A", "C"]]);
}
