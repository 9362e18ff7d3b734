//! RowSync Engine - Controller surface over the reconciliation kernel
//!
//! Binds the pieces of `rowsync-core` into a view-facing controller:
//! - The `QueryProvider` seam for fetching the backing collection, with an
//!   in-memory reference implementation
//! - The `SyncController`, which owns the snapshot, frames transactions,
//!   reconciles them, and drives a `RenderTarget`
//!
//! The controller is single-threaded, like the kernel underneath it. One
//! controller serves one rendered view.

pub mod controller;
pub mod provider;

pub use controller::SyncController;
pub use provider::{
    MemoryQueryProvider, QueryProvider, SortField, SortSpec, DEFAULT_BATCH_SIZE,
};
