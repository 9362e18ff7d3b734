//! Index reconciliation engine.
//!
//! Turns one transaction's raw, index-based change events into an ordered,
//! index-safe list of view operations plus the advanced snapshot.
//!
//! ## Entry point
//!
//! ```ignore
//! use rowsync_core::reconcile::reconcile;
//!
//! let outcome = reconcile(&snapshot, &transaction)?;
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical operation sequences.
//! - **Index safety**: section deletes descending then section inserts
//!   ascending, row deletes descending per section (pre-snapshot indices),
//!   row inserts ascending per section (post-snapshot indices), updates last
//!   in post-delete/pre-insert coordinates. Replaying the sequence in order
//!   against a mirror of the snapshot can never reference a shifted index.
//! - **Conservative fallback**: cross-section moves, and transactions that
//!   both delete and insert sections, collapse to a single `FullReload`
//!   instead of unprovable incremental math.
//! - **No partial recovery**: an event whose index contradicts the snapshot
//!   fails with a stale-index error; the caller escalates to a full reload.

pub mod engine;
pub mod model;

pub use engine::reconcile;
pub use model::{ReconcileOutcome, ViewOperation};
