use thiserror::Error;

/// Result type alias using RowSyncError
pub type Result<T> = std::result::Result<T, RowSyncError>;

/// Canonical error kind taxonomy
///
/// Every error maps to one of three stable kinds. The kind decides the
/// propagation policy: protocol violations are fatal caller bugs, stale index
/// references degrade to a full reload, and query failures are recoverable by
/// re-attaching a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// begin/end framing misuse; programming error, fatal, never retried
    ProtocolViolation,
    /// An event's index is inconsistent with the snapshot it targets
    StaleIndexReference,
    /// Upstream fetch/subscription failure
    QueryFailure,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::ProtocolViolation => "ERR_PROTOCOL_VIOLATION",
            ErrorKind::StaleIndexReference => "ERR_STALE_INDEX_REFERENCE",
            ErrorKind::QueryFailure => "ERR_QUERY_FAILURE",
        }
    }
}

/// Error taxonomy for RowSync operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowSyncError {
    // ===== Protocol violations (framing misuse) =====
    /// begin() called while a transaction is already open
    #[error("Transaction {open_txn_id} is already open: transactions are never nested or interleaved")]
    TransactionAlreadyOpen { open_txn_id: String },

    /// record() or end() called with no open transaction
    #[error("No open transaction: {op}() requires a preceding begin()")]
    NoOpenTransaction { op: String },

    /// Snapshot read attempted while a transaction is open
    #[error("Snapshot read during open transaction {open_txn_id}: reads are only valid between transactions")]
    ReadDuringTransaction { open_txn_id: String },

    // ===== Stale index references =====
    /// A section index is out of bounds against the snapshot it targets
    #[error("Stale section index {section} in {event}: snapshot has {bound} sections")]
    StaleSectionIndex {
        event: String,
        section: usize,
        bound: usize,
    },

    /// An item index is out of bounds against the snapshot it targets
    #[error("Stale item index in {event} at section {section}: item {item}, bound {bound}")]
    StaleItemIndex {
        event: String,
        section: usize,
        item: usize,
        bound: usize,
    },

    /// Two events claim the same target position within one transaction
    #[error("Conflicting {event} events at section {section}, index {index}: transaction contradicts itself")]
    ConflictingIndexClaim {
        event: String,
        section: usize,
        index: usize,
    },

    // ===== Query failures =====
    /// Upstream fetch or subscription failure
    #[error("Query provider failure in {op}: {reason}")]
    QueryFailure { op: String, reason: String },
}

impl RowSyncError {
    /// Get the canonical kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RowSyncError::TransactionAlreadyOpen { .. }
            | RowSyncError::NoOpenTransaction { .. }
            | RowSyncError::ReadDuringTransaction { .. } => ErrorKind::ProtocolViolation,

            RowSyncError::StaleSectionIndex { .. }
            | RowSyncError::StaleItemIndex { .. }
            | RowSyncError::ConflictingIndexClaim { .. } => ErrorKind::StaleIndexReference,

            RowSyncError::QueryFailure { .. } => ErrorKind::QueryFailure,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// True if this error must be treated as fatal (caller-side bug)
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::ProtocolViolation
    }
}
