//! Rendering seams.
//!
//! The engine never talks to a concrete view type. It drives a
//! [`RenderTarget`] for structural changes and a [`CellConfigurator`] for
//! content, so the same reconciliation core serves table views, collection
//! views, and the test mirror alike.

use rowsync_core_types::IndexPath;

use crate::model::Item;
use crate::reconcile::ViewOperation;
use crate::snapshot::SectionSnapshot;

/// Reuse identifier returned by the default [`CellConfigurator::reuse_id`]
pub const DEFAULT_CELL_REUSE_ID: &str = "entity-cell";

/// A sectioned view the engine applies operations to.
///
/// Implementations mirror the snapshot: after a batch is applied in order,
/// `section_count` and `item_count` must agree with the advanced snapshot.
pub trait RenderTarget {
    /// The per-row cell type handed to the configurator
    type Cell;

    /// Number of sections currently rendered
    fn section_count(&self) -> usize;

    /// Number of items currently rendered in the given section
    fn item_count(&self, section: usize) -> usize;

    /// Open a batch; structural operations until `end_batch` are one visual
    /// update
    fn begin_batch(&mut self);

    /// Close the current batch
    fn end_batch(&mut self);

    /// Apply one structural operation. Called only between `begin_batch` and
    /// `end_batch`, in the exact order the reconciler produced.
    fn apply_operation(&mut self, op: &ViewOperation);

    /// Mutable access to the cell at `path`, addressed in post-batch
    /// coordinates. `None` when the cell is not materialized (off-screen);
    /// `None` for a path the batch just produced signals a desynchronized
    /// view.
    fn cell_mut(&mut self, path: IndexPath) -> Option<&mut Self::Cell>;

    /// Discard all rendered state and rebuild from the snapshot
    fn full_reload(&mut self, snapshot: &SectionSnapshot);
}

/// Binds item content to cells.
///
/// `configure` is the one required method; views that never customize reuse
/// identifiers get [`DEFAULT_CELL_REUSE_ID`] for every path.
pub trait CellConfigurator<C> {
    /// Write the item's content into the cell
    fn configure(&self, cell: &mut C, item: &Item);

    /// Reuse identifier for the cell at `path`
    fn reuse_id(&self, _path: IndexPath) -> &str {
        DEFAULT_CELL_REUSE_ID
    }
}
