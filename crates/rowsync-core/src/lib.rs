//! RowSync Core - Change-reconciliation kernel for sectioned list views
//!
//! This crate keeps a rendered, sectioned list/grid view consistent with a
//! live backing collection that reports changes as a stream of per-item
//! notifications, including:
//! - Transaction framing via the `ChangeAccumulator` (begin/record/end)
//! - The index reconciler, which turns one transaction's raw events into an
//!   ordered, index-safe list of view operations
//! - The `apply` entry point, which drives a `RenderTarget` through the batch
//!   protocol and falls back to a full reload when incremental application
//!   cannot be proven safe
//! - The engine-owned `SectionSnapshot`, advanced only at transaction
//!   boundaries
//!
//! The kernel is single-threaded and synchronous: reconciliation is a pure
//! computation over buffered events, bounded by transaction size.

pub mod accumulator;
pub mod apply;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod reconcile;
pub mod render;
pub mod snapshot;

// Re-export commonly used types
pub use accumulator::ChangeAccumulator;
pub use apply::apply;
pub use errors::{ErrorKind, Result, RowSyncError};
pub use model::{ChangeEvent, Item, Section, Transaction};
pub use reconcile::{reconcile, ReconcileOutcome, ViewOperation};
pub use render::{CellConfigurator, RenderTarget, DEFAULT_CELL_REUSE_ID};
pub use snapshot::SectionSnapshot;
