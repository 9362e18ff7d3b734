//! Reconciled output types.

use rowsync_core_types::IndexPath;
use serde::{Deserialize, Serialize};

use crate::model::Item;
use crate::snapshot::SectionSnapshot;

/// One reconciled view operation.
///
/// Operations are only meaningful as part of the ordered sequence produced by
/// [`reconcile`](super::reconcile): applying them out of order reintroduces
/// the index corruption the reconciler exists to prevent.
///
/// Coordinate conventions:
/// - `DeleteSection` carries a pre-transaction section index,
///   `InsertSection` a post-transaction one.
/// - Row operations carry the section index as it stands after the section
///   pass. `DeleteItem` item indices are pre-transaction, `InsertItem` item
///   indices post-transaction, and `UpdateItem` item indices are relative to
///   the post-delete/pre-insert state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewOperation {
    /// Insert the item now present at `path` in the advanced snapshot
    InsertItem(IndexPath),
    /// Delete the item at `path`
    DeleteItem(IndexPath),
    /// Re-configure the persisting item at `path`
    UpdateItem(IndexPath),
    /// Move one item within its section
    MoveItem { from: IndexPath, to: IndexPath },
    /// Insert an empty section at the given index
    InsertSection(usize),
    /// Delete the section at the given index, including its rows
    DeleteSection(usize),
    /// Discard incremental application and refresh the whole view
    FullReload,
}

/// Result of reconciling one transaction against a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    /// Ordered view operations; `[FullReload]` alone when incremental
    /// application was not provably safe
    pub operations: Vec<ViewOperation>,

    /// The advanced snapshot the view must converge to
    pub snapshot: SectionSnapshot,

    /// New content for each emitted `UpdateItem`, keyed by the operation's
    /// path, for the configuration pass
    pub updated_items: Vec<(IndexPath, Item)>,
}

impl ReconcileOutcome {
    /// An outcome that leaves the view untouched (empty transaction)
    pub fn unchanged(snapshot: SectionSnapshot) -> Self {
        Self {
            operations: Vec::new(),
            snapshot,
            updated_items: Vec::new(),
        }
    }

    /// An outcome that replaces incremental application with a full reload
    pub fn full_reload(snapshot: SectionSnapshot) -> Self {
        Self {
            operations: vec![ViewOperation::FullReload],
            snapshot,
            updated_items: Vec::new(),
        }
    }

    /// True if this outcome is the conservative full-reload fallback
    pub fn is_full_reload(&self) -> bool {
        matches!(self.operations.as_slice(), [ViewOperation::FullReload])
    }
}
