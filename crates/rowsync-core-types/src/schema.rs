//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Domain identifiers
pub const FIELD_TXN_ID: &str = "txn_id";
pub const FIELD_SECTION: &str = "section";
pub const FIELD_ITEM: &str = "item";

// Collection sizes
pub const FIELD_EVENT_COUNT: &str = "event_count";
pub const FIELD_OP_COUNT: &str = "op_count";
pub const FIELD_SECTION_COUNT: &str = "section_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
