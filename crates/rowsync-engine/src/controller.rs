//! View-facing sync controller.
//!
//! One `SyncController` owns one view's snapshot and transaction framing.
//! The change source calls `begin_changes`/`record_change`/`end_changes`;
//! the controller reconciles each closed transaction and drives the render
//! target, degrading to a full reload whenever incremental application
//! cannot be trusted.

use std::time::Instant;

use rowsync_core::errors::{ErrorKind, Result, RowSyncError};
use rowsync_core::{
    apply, reconcile, CellConfigurator, ChangeAccumulator, ChangeEvent, ReconcileOutcome,
    RenderTarget, SectionSnapshot,
};
use rowsync_core::{log_op_end, log_op_error, log_op_start};
use rowsync_core_types::TransactionId;
use tracing::warn;

use crate::provider::{QueryProvider, SortSpec, DEFAULT_BATCH_SIZE};

/// Controller binding a query provider, the reconciliation kernel, and one
/// rendered view
pub struct SyncController<P: QueryProvider> {
    provider: P,
    sort: SortSpec,
    batch_size: usize,
    accumulator: ChangeAccumulator,
    snapshot: SectionSnapshot,
}

impl<P: QueryProvider> SyncController<P> {
    /// Create a controller with the default sort order and batch size.
    /// The snapshot starts empty; call [`initial_load`](Self::initial_load)
    /// to populate it.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            sort: SortSpec::unsorted(),
            batch_size: DEFAULT_BATCH_SIZE,
            accumulator: ChangeAccumulator::new(),
            snapshot: SectionSnapshot::empty(),
        }
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Fetch the backing collection and render it from scratch.
    ///
    /// On fetch failure the controller falls back to an empty snapshot and an
    /// empty view, so the caller always ends up in a renderable state.
    ///
    /// # Errors
    ///
    /// Returns the `QueryFailure` after degrading, so the caller can surface
    /// it. Re-attach a working provider and call this again to recover.
    pub fn initial_load<T, C>(&mut self, target: &mut T, configurator: &C) -> Result<()>
    where
        T: RenderTarget,
        C: CellConfigurator<T::Cell>,
    {
        let start = Instant::now();
        log_op_start!("initial_load");

        match self.provider.fetch(&self.sort, self.batch_size) {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                apply(
                    &ReconcileOutcome::full_reload(self.snapshot.clone()),
                    target,
                    configurator,
                )?;
                log_op_end!(
                    "initial_load",
                    duration_ms = start.elapsed().as_millis() as u64,
                    section_count = self.snapshot.section_count()
                );
                Ok(())
            }
            Err(err) => {
                self.snapshot = SectionSnapshot::empty();
                apply(
                    &ReconcileOutcome::full_reload(self.snapshot.clone()),
                    target,
                    configurator,
                )?;
                log_op_error!(
                    "initial_load",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    /// Replace the query provider and load from scratch, typically after a
    /// `QueryFailure`. The previous snapshot is discarded either way.
    ///
    /// # Errors
    ///
    /// Same contract as [`initial_load`](Self::initial_load).
    pub fn reattach<T, C>(&mut self, provider: P, target: &mut T, configurator: &C) -> Result<()>
    where
        T: RenderTarget,
        C: CellConfigurator<T::Cell>,
    {
        self.provider = provider;
        self.snapshot = SectionSnapshot::empty();
        self.initial_load(target, configurator)
    }

    /// Open a change transaction
    ///
    /// # Errors
    ///
    /// Returns `TransactionAlreadyOpen` if one is already open.
    pub fn begin_changes(&mut self) -> Result<TransactionId> {
        self.accumulator.begin()
    }

    /// Record one change event into the open transaction
    ///
    /// # Errors
    ///
    /// Returns `NoOpenTransaction` outside a transaction.
    pub fn record_change(&mut self, event: ChangeEvent) -> Result<()> {
        self.accumulator.record(event)
    }

    /// Close the open transaction, reconcile it, and drive the target.
    ///
    /// Stale index references degrade: the backing collection is re-fetched
    /// and the view fully reloaded, and the call still succeeds. A failing
    /// re-fetch degrades further to an empty view and returns the
    /// `QueryFailure`. Protocol violations propagate untouched.
    ///
    /// # Errors
    ///
    /// `NoOpenTransaction` when no transaction is open; `QueryFailure` when
    /// recovery needed a re-fetch and that failed too.
    pub fn end_changes<T, C>(&mut self, target: &mut T, configurator: &C) -> Result<()>
    where
        T: RenderTarget,
        C: CellConfigurator<T::Cell>,
    {
        let start = Instant::now();
        log_op_start!("end_changes");

        let txn = match self.accumulator.end() {
            Ok(txn) => txn,
            Err(err) => {
                log_op_error!(
                    "end_changes",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                return Err(err);
            }
        };

        match reconcile(&self.snapshot, &txn) {
            Ok(outcome) => {
                apply(&outcome, target, configurator)?;
                self.snapshot = outcome.snapshot;
                log_op_end!(
                    "end_changes",
                    duration_ms = start.elapsed().as_millis() as u64,
                    txn_id = %txn.id,
                    event_count = txn.len(),
                    op_count = outcome.operations.len()
                );
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::StaleIndexReference => {
                warn!(
                    txn_id = %txn.id,
                    error = %err,
                    "transaction contradicted the snapshot, re-fetching"
                );
                let result = self.recover_by_refetch(target, configurator);
                match &result {
                    Ok(()) => {
                        log_op_end!(
                            "end_changes",
                            duration_ms = start.elapsed().as_millis() as u64,
                            txn_id = %txn.id,
                            recovered = true
                        );
                    }
                    Err(refetch_err) => {
                        log_op_error!(
                            "end_changes",
                            refetch_err.clone(),
                            duration_ms = start.elapsed().as_millis() as u64
                        );
                    }
                }
                result
            }
            Err(err) => {
                log_op_error!(
                    "end_changes",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    fn recover_by_refetch<T, C>(&mut self, target: &mut T, configurator: &C) -> Result<()>
    where
        T: RenderTarget,
        C: CellConfigurator<T::Cell>,
    {
        match self.provider.fetch(&self.sort, self.batch_size) {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                apply(
                    &ReconcileOutcome::full_reload(self.snapshot.clone()),
                    target,
                    configurator,
                )
            }
            Err(err) => {
                self.snapshot = SectionSnapshot::empty();
                apply(
                    &ReconcileOutcome::full_reload(self.snapshot.clone()),
                    target,
                    configurator,
                )?;
                Err(err)
            }
        }
    }

    /// The current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ReadDuringTransaction` while a transaction is open: the
    /// snapshot only reflects reality between transactions.
    pub fn snapshot(&self) -> Result<&SectionSnapshot> {
        if let Some(id) = self.accumulator.open_transaction_id() {
            return Err(RowSyncError::ReadDuringTransaction {
                open_txn_id: id.to_string(),
            });
        }
        Ok(&self.snapshot)
    }

    /// Number of sections in the current snapshot
    ///
    /// # Errors
    ///
    /// Returns `ReadDuringTransaction` while a transaction is open.
    pub fn section_count(&self) -> Result<usize> {
        Ok(self.snapshot()?.section_count())
    }

    /// Number of items in one section of the current snapshot
    ///
    /// # Errors
    ///
    /// Returns `ReadDuringTransaction` while a transaction is open, or
    /// `StaleSectionIndex` for an out-of-bounds section.
    pub fn item_count(&self, section: usize) -> Result<usize> {
        self.snapshot()?.item_count(section)
    }
}
