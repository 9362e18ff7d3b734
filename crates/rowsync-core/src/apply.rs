//! Batch application of a reconciled outcome to a render target.

use std::collections::BTreeMap;

use rowsync_core_types::IndexPath;
use tracing::warn;

use crate::errors::Result;
use crate::reconcile::{ReconcileOutcome, ViewOperation};
use crate::render::{CellConfigurator, RenderTarget};
use crate::snapshot::SectionSnapshot;

/// Apply a reconciled outcome to a render target.
///
/// Structural operations are applied in order inside one batch, then a
/// configuration pass binds content to every cell the batch touched. A
/// full-reload outcome, a post-batch count mismatch, or a missing cell at a
/// path the batch just produced all collapse to a full reload of the target.
///
/// # Errors
///
/// Propagates snapshot lookup failures, which indicate an internally
/// inconsistent outcome rather than a view problem.
pub fn apply<T, C>(outcome: &ReconcileOutcome, target: &mut T, configurator: &C) -> Result<()>
where
    T: RenderTarget,
    C: CellConfigurator<T::Cell>,
{
    if outcome.is_full_reload() {
        reload_and_configure(target, &outcome.snapshot, configurator)?;
        return Ok(());
    }

    if !outcome.operations.is_empty() {
        target.begin_batch();
        for op in &outcome.operations {
            target.apply_operation(op);
        }
        target.end_batch();
    }

    if !counts_match(target, &outcome.snapshot) {
        warn!(
            target_sections = target.section_count(),
            snapshot_sections = outcome.snapshot.section_count(),
            "render target diverged from snapshot after batch, reloading"
        );
        reload_and_configure(target, &outcome.snapshot, configurator)?;
        return Ok(());
    }

    // Inserted item positions per section, for resolving update paths that
    // were emitted in pre-insert coordinates.
    let mut inserts_by_section: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for op in &outcome.operations {
        if let ViewOperation::InsertItem(path) = op {
            inserts_by_section
                .entry(path.section)
                .or_default()
                .push(path.item);
        }
    }
    for positions in inserts_by_section.values_mut() {
        positions.sort_unstable();
    }

    // Configuration pass: fresh inserts and move destinations take content
    // from the advanced snapshot, updates carry their own content.
    for op in &outcome.operations {
        let path = match op {
            ViewOperation::InsertItem(path) => *path,
            ViewOperation::MoveItem { to, .. } => *to,
            _ => continue,
        };
        let item = outcome.snapshot.item_at(path)?.clone();
        match target.cell_mut(path) {
            Some(cell) => configurator.configure(cell, &item),
            None => {
                warn!(
                    section = path.section,
                    item = path.item,
                    "no cell at freshly produced path, reloading"
                );
                return reload_and_configure(target, &outcome.snapshot, configurator);
            }
        }
    }

    for (path, item) in &outcome.updated_items {
        let final_item = inserts_by_section
            .get(&path.section)
            .map(|positions| shift_past_inserts(path.item, positions))
            .unwrap_or(path.item);
        let final_path = IndexPath::new(path.section, final_item);
        match target.cell_mut(final_path) {
            Some(cell) => configurator.configure(cell, item),
            None => {
                warn!(
                    section = final_path.section,
                    item = final_path.item,
                    "no cell at updated path, reloading"
                );
                return reload_and_configure(target, &outcome.snapshot, configurator);
            }
        }
    }

    Ok(())
}

/// Resolve a post-delete/pre-insert item index to its final position by
/// shifting past the insertions the batch placed at or below it.
fn shift_past_inserts(item: usize, insert_positions: &[usize]) -> usize {
    let mut resolved = item;
    for pos in insert_positions {
        if *pos <= resolved {
            resolved += 1;
        }
    }
    resolved
}

fn counts_match<T: RenderTarget>(target: &T, snapshot: &SectionSnapshot) -> bool {
    if target.section_count() != snapshot.section_count() {
        return false;
    }
    snapshot
        .sections
        .iter()
        .enumerate()
        .all(|(s, section)| target.item_count(s) == section.items.len())
}

fn reload_and_configure<T, C>(
    target: &mut T,
    snapshot: &SectionSnapshot,
    configurator: &C,
) -> Result<()>
where
    T: RenderTarget,
    C: CellConfigurator<T::Cell>,
{
    target.full_reload(snapshot);
    for path in snapshot.paths().collect::<Vec<_>>() {
        let item = snapshot.item_at(path)?.clone();
        // cells not materialized after a reload are configured on demand by
        // the view, not here
        if let Some(cell) = target.cell_mut(path) {
            configurator.configure(cell, &item);
        }
    }
    Ok(())
}
