//! Transaction framing and event buffering
//!
//! The `ChangeAccumulator` buffers the events of one update transaction,
//! enforcing the begin/record/end protocol. It is pure buffering: no
//! reordering, no deduplication. Arrival order matters for tie-breaking
//! during reconciliation, so it is preserved exactly.
//!
//! Exactly one transaction may be open at a time. Opening a second one, or
//! recording/ending outside an open transaction, is a fatal
//! `ProtocolViolation` - never a queued or retried condition.

use rowsync_core_types::TransactionId;
use tracing::debug;

use crate::errors::{Result, RowSyncError};
use crate::model::{ChangeEvent, Transaction};

/// Buffers one transaction's events between begin() and end()
#[derive(Debug, Default)]
pub struct ChangeAccumulator {
    open: Option<OpenTransaction>,
}

#[derive(Debug)]
struct OpenTransaction {
    id: TransactionId,
    events: Vec<ChangeEvent>,
}

impl ChangeAccumulator {
    /// Create a new accumulator with no open transaction
    pub fn new() -> Self {
        Self { open: None }
    }

    /// True if a transaction is currently open
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Identity of the open transaction, if any
    pub fn open_transaction_id(&self) -> Option<&TransactionId> {
        self.open.as_ref().map(|t| &t.id)
    }

    /// Open a new transaction
    ///
    /// # Errors
    ///
    /// Returns `TransactionAlreadyOpen` if a transaction is already open.
    pub fn begin(&mut self) -> Result<TransactionId> {
        if let Some(open) = &self.open {
            return Err(RowSyncError::TransactionAlreadyOpen {
                open_txn_id: open.id.to_string(),
            });
        }

        let id = TransactionId::new();
        debug!(txn_id = %id, "transaction opened");
        self.open = Some(OpenTransaction {
            id: id.clone(),
            events: Vec::new(),
        });
        Ok(id)
    }

    /// Append an event to the open transaction, preserving arrival order
    ///
    /// # Errors
    ///
    /// Returns `NoOpenTransaction` if no transaction is open.
    pub fn record(&mut self, event: ChangeEvent) -> Result<()> {
        let open = self
            .open
            .as_mut()
            .ok_or_else(|| RowSyncError::NoOpenTransaction {
                op: "record".to_string(),
            })?;
        open.events.push(event);
        Ok(())
    }

    /// Close the open transaction and return the buffered events
    ///
    /// Side effect: resets the internal buffer so a new transaction can open.
    ///
    /// # Errors
    ///
    /// Returns `NoOpenTransaction` if no transaction is open.
    pub fn end(&mut self) -> Result<Transaction> {
        let open = self
            .open
            .take()
            .ok_or_else(|| RowSyncError::NoOpenTransaction {
                op: "end".to_string(),
            })?;
        debug!(txn_id = %open.id, event_count = open.events.len(), "transaction closed");
        Ok(Transaction::new(open.id, open.events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowsync_core_types::IndexPath;

    #[test]
    fn test_begin_record_end_happy_path() {
        let mut acc = ChangeAccumulator::new();
        assert!(!acc.is_open());

        acc.begin().unwrap();
        assert!(acc.is_open());

        acc.record(ChangeEvent::DeleteItem {
            path: IndexPath::new(0, 0),
        })
        .unwrap();

        let txn = acc.end().unwrap();
        assert_eq!(txn.len(), 1);
        assert!(!acc.is_open());
    }

    #[test]
    fn test_double_begin_is_protocol_violation() {
        let mut acc = ChangeAccumulator::new();
        acc.begin().unwrap();

        let result = acc.begin();
        assert!(matches!(
            result,
            Err(RowSyncError::TransactionAlreadyOpen { .. })
        ));

        // The original transaction is still open and usable
        assert!(acc.is_open());
        assert!(acc.end().is_ok());
    }

    #[test]
    fn test_record_without_begin_is_protocol_violation() {
        let mut acc = ChangeAccumulator::new();
        let result = acc.record(ChangeEvent::DeleteItem {
            path: IndexPath::new(0, 0),
        });
        assert!(matches!(result, Err(RowSyncError::NoOpenTransaction { .. })));
    }

    #[test]
    fn test_end_without_begin_is_protocol_violation() {
        let mut acc = ChangeAccumulator::new();
        let result = acc.end();
        assert!(matches!(result, Err(RowSyncError::NoOpenTransaction { .. })));
    }

    #[test]
    fn test_end_resets_buffer() {
        let mut acc = ChangeAccumulator::new();
        acc.begin().unwrap();
        acc.record(ChangeEvent::DeleteItem {
            path: IndexPath::new(0, 0),
        })
        .unwrap();
        acc.end().unwrap();

        // A fresh transaction starts empty
        acc.begin().unwrap();
        let txn = acc.end().unwrap();
        assert!(txn.is_empty());
    }

    #[test]
    fn test_arrival_order_preserved() {
        let mut acc = ChangeAccumulator::new();
        acc.begin().unwrap();

        let first = ChangeEvent::DeleteItem {
            path: IndexPath::new(0, 2),
        };
        let second = ChangeEvent::DeleteItem {
            path: IndexPath::new(0, 0),
        };
        acc.record(first.clone()).unwrap();
        acc.record(second.clone()).unwrap();

        let txn = acc.end().unwrap();
        assert_eq!(txn.events, vec![first, second]);
    }

    #[test]
    fn test_transactions_get_distinct_ids() {
        let mut acc = ChangeAccumulator::new();
        let a = acc.begin().unwrap();
        acc.end().unwrap();
        let b = acc.begin().unwrap();
        acc.end().unwrap();
        assert_ne!(a, b);
    }
}
