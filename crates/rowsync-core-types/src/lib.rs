//! Core types shared across RowSync facilities
//!
//! This crate provides foundational types used by the reconciliation kernel
//! and the orchestration layer:
//!
//! - **Path types**: IndexPath addressing into a sectioned collection
//! - **Identity types**: SectionKey, ItemKey, TransactionId
//! - **Schema constants**: Canonical field keys and event names for logging

pub mod identity;
pub mod path;
pub mod schema;

pub use identity::{ItemKey, SectionKey, TransactionId};
pub use path::IndexPath;
