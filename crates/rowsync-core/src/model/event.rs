//! Change events and transactions
//!
//! A `Transaction` is one atomic update to the backing collection: an ordered
//! sequence of `ChangeEvent`s bracketed by the accumulator's begin/end
//! framing. Index semantics follow the upstream convention:
//!
//! - `DeleteItem`, `UpdateItem`, `DeleteSection`, and a move's `from` refer to
//!   the **pre-transaction** snapshot
//! - `InsertItem`, `InsertSection`, and a move's `to` refer to the
//!   **post-transaction** snapshot
//!
//! Mixing these naively corrupts positions; only the reconciler translates
//! them into an index-safe operation sequence.

use rowsync_core_types::{IndexPath, SectionKey, TransactionId};
use serde::{Deserialize, Serialize};

use super::item::Item;

/// One raw change notification from the backing collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeEvent {
    /// A new item appeared at `path` (post-transaction coordinates).
    /// Carries the item so the snapshot can be advanced.
    InsertItem { path: IndexPath, item: Item },

    /// The item at `path` (pre-transaction coordinates) disappeared
    DeleteItem { path: IndexPath },

    /// The item at `path` (pre-transaction coordinates) changed content.
    /// Carries the new item value.
    UpdateItem { path: IndexPath, item: Item },

    /// The item at `from` (pre) moved to `to` (post)
    MoveItem { from: IndexPath, to: IndexPath },

    /// A new section appeared at `index` (post-transaction coordinates)
    InsertSection { index: usize, key: SectionKey },

    /// The section at `index` (pre-transaction coordinates) disappeared,
    /// taking its rows with it
    DeleteSection { index: usize },
}

impl ChangeEvent {
    /// Short name used in logs and stale-index error context
    pub fn name(&self) -> &'static str {
        match self {
            ChangeEvent::InsertItem { .. } => "insert_item",
            ChangeEvent::DeleteItem { .. } => "delete_item",
            ChangeEvent::UpdateItem { .. } => "update_item",
            ChangeEvent::MoveItem { .. } => "move_item",
            ChangeEvent::InsertSection { .. } => "insert_section",
            ChangeEvent::DeleteSection { .. } => "delete_section",
        }
    }
}

/// One atomic update to the backing collection
///
/// Events are kept in arrival order; the accumulator never reorders or
/// deduplicates, because arrival order is the tie-breaker during
/// reconciliation (e.g. move-chain collapsing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identity assigned when the transaction was opened
    pub id: TransactionId,

    /// Buffered events in arrival order
    pub events: Vec<ChangeEvent>,
}

impl Transaction {
    /// Create a transaction from already-buffered events
    pub fn new(id: TransactionId, events: Vec<ChangeEvent>) -> Self {
        Self { id, events }
    }

    /// True if the transaction carries no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.events.len()
    }
}
