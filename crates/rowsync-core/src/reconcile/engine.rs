//! Reconciliation computation.
//!
//! The entry point is [`reconcile`], which accepts one transaction and the
//! current snapshot and produces a [`ReconcileOutcome`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rowsync_core_types::{IndexPath, SectionKey};
use tracing::debug;

use crate::errors::{Result, RowSyncError};
use crate::model::{ChangeEvent, Item, Section, Transaction};
use crate::reconcile::model::{ReconcileOutcome, ViewOperation};
use crate::snapshot::SectionSnapshot;

/// Where an inserted row's content comes from.
#[derive(Debug, Clone)]
enum InsertSource {
    /// A new item delivered by the insert event
    New(Item),
    /// The arrival half of a move; content is captured from the origin row
    MoveArrival { from_section: usize, from_item: usize },
}

/// Accumulated row-level changes for one post-pass section.
#[derive(Debug, Default)]
struct SectionChanges {
    /// Pre-transaction index of this section, None for newly inserted ones
    pre_idx: Option<usize>,
    /// Pre-transaction item count (0 for new sections)
    pre_len: usize,
    /// Pre-transaction item indices leaving the section: explicit deletes
    /// plus move departures
    removals: BTreeSet<usize>,
    /// The subset of `removals` that came from delete events
    explicit_deletes: BTreeSet<usize>,
    /// Post-transaction item index -> content source
    inserts: BTreeMap<usize, InsertSource>,
    /// Updates that produce an UpdateItem operation (pre indices)
    updates_to_emit: BTreeMap<usize, Item>,
    /// All content updates applied to the snapshot, including ones subsumed
    /// by a move of the same row (pre indices)
    snapshot_updates: BTreeMap<usize, Item>,
    /// Collapsed same-section moves: (pre from-index, post to-index)
    same_section_moves: Vec<(usize, usize)>,
}

impl SectionChanges {
    /// The move to emit as a single MoveItem, if the move is the sole change
    /// touching this section. Any other structural or content change forces
    /// decomposition into the delete/insert passes.
    fn sole_move(&self) -> Option<(usize, usize)> {
        if self.same_section_moves.len() == 1
            && self.explicit_deletes.is_empty()
            && self.updates_to_emit.is_empty()
            && self.removals.len() == 1
            && self.inserts.len() == 1
        {
            self.same_section_moves.first().copied()
        } else {
            None
        }
    }

    /// Item count after removals and inserts are applied
    fn post_len(&self) -> usize {
        self.pre_len - self.removals.len() + self.inserts.len()
    }
}

fn stale_section(event: &str, section: usize, bound: usize) -> RowSyncError {
    RowSyncError::StaleSectionIndex {
        event: event.to_string(),
        section,
        bound,
    }
}

fn stale_item(event: &str, section: usize, item: usize, bound: usize) -> RowSyncError {
    RowSyncError::StaleItemIndex {
        event: event.to_string(),
        section,
        item,
        bound,
    }
}

fn conflicting(event: &str, section: usize, index: usize) -> RowSyncError {
    RowSyncError::ConflictingIndexClaim {
        event: event.to_string(),
        section,
        index,
    }
}

fn changes_entry<'a>(
    changes: &'a mut BTreeMap<usize, SectionChanges>,
    slots: &[Option<usize>],
    snapshot: &SectionSnapshot,
    post: usize,
) -> &'a mut SectionChanges {
    changes.entry(post).or_insert_with(|| {
        let pre_idx = slots.get(post).copied().flatten();
        let pre_len = pre_idx
            .and_then(|p| snapshot.sections.get(p))
            .map(|s| s.items.len())
            .unwrap_or(0);
        SectionChanges {
            pre_idx,
            pre_len,
            ..SectionChanges::default()
        }
    })
}

/// Reconcile one transaction against the current snapshot.
///
/// Returns the ordered view operations and the advanced snapshot. The caller
/// applies the operations in exactly the produced order, then replaces its
/// snapshot with the returned one.
///
/// # Errors
///
/// Returns a `StaleIndexReference`-kind error when an event's index is
/// inconsistent with the snapshot it targets (out of bounds, or two events
/// claiming the same position). No partial recovery is attempted; the caller
/// escalates to a full reload.
pub fn reconcile(snapshot: &SectionSnapshot, txn: &Transaction) -> Result<ReconcileOutcome> {
    if txn.is_empty() {
        return Ok(ReconcileOutcome::unchanged(snapshot.clone()));
    }

    let pre_section_count = snapshot.section_count();

    // Step 1a: section-level events.
    let mut section_deletes: BTreeSet<usize> = BTreeSet::new();
    let mut section_inserts: BTreeMap<usize, SectionKey> = BTreeMap::new();
    for ev in &txn.events {
        match ev {
            ChangeEvent::DeleteSection { index } => {
                if *index >= pre_section_count {
                    return Err(stale_section("delete_section", *index, pre_section_count));
                }
                section_deletes.insert(*index);
            }
            ChangeEvent::InsertSection { index, key } => {
                if section_inserts.insert(*index, key.clone()).is_some() {
                    return Err(conflicting("insert_section", *index, *index));
                }
            }
            _ => {}
        }
    }

    let post_section_count = pre_section_count - section_deletes.len() + section_inserts.len();
    for index in section_inserts.keys() {
        if *index >= post_section_count {
            return Err(stale_section("insert_section", *index, post_section_count));
        }
    }

    // A section deleted and a section inserted in one transaction cannot be
    // proven distinct from a re-insertion at a different index.
    let section_churn = !section_deletes.is_empty() && !section_inserts.is_empty();

    // Map surviving pre sections to their post indices by simulating the
    // section pass: survivors keep relative order, new sections slot in
    // ascending.
    let mut slots: Vec<Option<usize>> = (0..pre_section_count)
        .filter(|s| !section_deletes.contains(s))
        .map(Some)
        .collect();
    for index in section_inserts.keys() {
        if *index > slots.len() {
            return Err(stale_section("insert_section", *index, slots.len()));
        }
        slots.insert(*index, None);
    }
    let mut pre_to_post: HashMap<usize, usize> = HashMap::new();
    for (post, slot) in slots.iter().enumerate() {
        if let Some(pre) = slot {
            pre_to_post.insert(*pre, post);
        }
    }

    // Step 1b: partition row-level events, preserving arrival order.
    let mut changes: BTreeMap<usize, SectionChanges> = BTreeMap::new();
    let mut raw_moves: Vec<(IndexPath, IndexPath)> = Vec::new();

    for ev in &txn.events {
        match ev {
            ChangeEvent::DeleteItem { path } => {
                let s = path.section;
                if s >= pre_section_count {
                    return Err(stale_section("delete_item", s, pre_section_count));
                }
                if section_deletes.contains(&s) {
                    // rows die with their section
                    continue;
                }
                let len = snapshot.sections[s].items.len();
                if path.item >= len {
                    return Err(stale_item("delete_item", s, path.item, len));
                }
                let post = pre_to_post[&s];
                let ch = changes_entry(&mut changes, &slots, snapshot, post);
                ch.removals.insert(path.item);
                ch.explicit_deletes.insert(path.item);
            }
            ChangeEvent::UpdateItem { path, item } => {
                let s = path.section;
                if s >= pre_section_count {
                    return Err(stale_section("update_item", s, pre_section_count));
                }
                if section_deletes.contains(&s) {
                    continue;
                }
                let len = snapshot.sections[s].items.len();
                if path.item >= len {
                    return Err(stale_item("update_item", s, path.item, len));
                }
                let post = pre_to_post[&s];
                let ch = changes_entry(&mut changes, &slots, snapshot, post);
                // last update for a row wins
                ch.updates_to_emit.insert(path.item, item.clone());
                ch.snapshot_updates.insert(path.item, item.clone());
            }
            ChangeEvent::InsertItem { path, item } => {
                let s = path.section;
                if s >= post_section_count {
                    return Err(stale_section("insert_item", s, post_section_count));
                }
                let ch = changes_entry(&mut changes, &slots, snapshot, s);
                if ch
                    .inserts
                    .insert(path.item, InsertSource::New(item.clone()))
                    .is_some()
                {
                    return Err(conflicting("insert_item", s, path.item));
                }
            }
            ChangeEvent::MoveItem { from, to } => {
                raw_moves.push((*from, *to));
            }
            ChangeEvent::InsertSection { .. } | ChangeEvent::DeleteSection { .. } => {}
        }
    }

    // Step 2a: a delete beats a pending update for the same row.
    for ch in changes.values_mut() {
        let deleted: Vec<usize> = ch.explicit_deletes.iter().copied().collect();
        for d in deleted {
            ch.updates_to_emit.remove(&d);
            ch.snapshot_updates.remove(&d);
        }
    }

    // Step 2b: collapse move chains (A->B then B->C becomes A->C), drop
    // no-op moves left behind by the collapse.
    let mut effective_moves: Vec<(IndexPath, IndexPath)> = Vec::new();
    for (from, to) in raw_moves {
        if let Some(prev) = effective_moves.iter_mut().find(|(_, t)| *t == from) {
            prev.1 = to;
        } else {
            effective_moves.push((from, to));
        }
    }
    effective_moves.retain(|(from, to)| from != to);

    let mut cross_section_move = false;
    for (from, to) in &effective_moves {
        if from.section >= pre_section_count {
            return Err(stale_section("move_item", from.section, pre_section_count));
        }
        if section_deletes.contains(&from.section) {
            // origin section is gone; the move is moot
            continue;
        }
        let len = snapshot.sections[from.section].items.len();
        if from.item >= len {
            return Err(stale_item("move_item", from.section, from.item, len));
        }
        if to.section >= post_section_count {
            return Err(stale_section("move_item", to.section, post_section_count));
        }
        if from.section != to.section {
            cross_section_move = true;
        }

        let from_post = pre_to_post[&from.section];
        if changes
            .get(&from_post)
            .map(|ch| ch.explicit_deletes.contains(&from.item))
            .unwrap_or(false)
        {
            // delete beats a move of the same origin row
            continue;
        }

        // departure: accounted for in the delete pass
        let ch = changes_entry(&mut changes, &slots, snapshot, from_post);
        ch.removals.insert(from.item);
        // an update of the move origin is subsumed: the content still lands
        // in the snapshot, but the arrival configuration replaces UpdateItem
        if let Some(item) = ch.updates_to_emit.remove(&from.item) {
            ch.snapshot_updates.insert(from.item, item);
        }

        // arrival: accounted for in the insert pass
        let ch_to = changes_entry(&mut changes, &slots, snapshot, to.section);
        if ch_to
            .inserts
            .insert(
                to.item,
                InsertSource::MoveArrival {
                    from_section: from.section,
                    from_item: from.item,
                },
            )
            .is_some()
        {
            return Err(conflicting("move_item", to.section, to.item));
        }

        if from.section == to.section {
            let ch = changes_entry(&mut changes, &slots, snapshot, from_post);
            ch.same_section_moves.push((from.item, to.item));
        }
    }

    // Validate insert positions against the post-transaction item counts.
    for (post_s, ch) in &changes {
        let post_len = ch.post_len();
        for idx in ch.inserts.keys() {
            if *idx >= post_len {
                return Err(stale_item("insert_item", *post_s, *idx, post_len));
            }
        }
    }

    // Advance the snapshot: content updates in place, capture moved rows,
    // remove descending, section pass, insert ascending.
    let mut sections: Vec<Section> = snapshot.sections.clone();

    for ch in changes.values() {
        if let Some(pre_s) = ch.pre_idx {
            for (i, item) in &ch.snapshot_updates {
                if let Some(slot) = sections.get_mut(pre_s).and_then(|sec| sec.items.get_mut(*i)) {
                    *slot = item.clone();
                }
            }
        }
    }

    let mut captured: HashMap<(usize, usize), Item> = HashMap::new();
    for ch in changes.values() {
        for source in ch.inserts.values() {
            if let InsertSource::MoveArrival {
                from_section,
                from_item,
            } = source
            {
                let item = sections
                    .get(*from_section)
                    .and_then(|sec| sec.items.get(*from_item))
                    .cloned()
                    .ok_or_else(|| {
                        stale_item("move_item", *from_section, *from_item, 0)
                    })?;
                captured.insert((*from_section, *from_item), item);
            }
        }
    }

    for ch in changes.values() {
        if let Some(pre_s) = ch.pre_idx {
            if let Some(sec) = sections.get_mut(pre_s) {
                for i in ch.removals.iter().rev() {
                    sec.items.remove(*i);
                }
            }
        }
    }

    for s in section_deletes.iter().rev() {
        sections.remove(*s);
    }
    for (index, key) in &section_inserts {
        sections.insert(*index, Section::new(key.clone()));
    }

    for (post_s, ch) in &changes {
        let sec = sections
            .get_mut(*post_s)
            .ok_or_else(|| stale_section("insert_item", *post_s, 0))?;
        for (idx, source) in &ch.inserts {
            let item = match source {
                InsertSource::New(item) => item.clone(),
                InsertSource::MoveArrival {
                    from_section,
                    from_item,
                } => captured
                    .get(&(*from_section, *from_item))
                    .cloned()
                    .ok_or_else(|| stale_item("move_item", *from_section, *from_item, 0))?,
            };
            sec.items.insert(*idx, item);
        }
    }

    let advanced = SectionSnapshot::from_sections(sections);

    // Step 7: conservative fallback over unprovable incremental math.
    if cross_section_move || section_churn {
        debug!(
            txn_id = %txn.id,
            cross_section_move,
            section_churn,
            "incremental application not provably safe, emitting full reload"
        );
        return Ok(ReconcileOutcome::full_reload(advanced));
    }

    // Steps 3-6: emission. Section deletes descending, section inserts
    // ascending, row deletes descending per section, row inserts ascending,
    // sole moves, updates last in post-delete/pre-insert coordinates.
    let mut operations: Vec<ViewOperation> = Vec::new();
    let mut updated_items: Vec<(IndexPath, Item)> = Vec::new();

    for s in section_deletes.iter().rev() {
        operations.push(ViewOperation::DeleteSection(*s));
    }
    for index in section_inserts.keys() {
        operations.push(ViewOperation::InsertSection(*index));
    }

    for (post_s, ch) in &changes {
        if ch.sole_move().is_some() {
            continue;
        }
        for i in ch.removals.iter().rev() {
            operations.push(ViewOperation::DeleteItem(IndexPath::new(*post_s, *i)));
        }
    }

    for (post_s, ch) in &changes {
        if ch.sole_move().is_some() {
            continue;
        }
        for idx in ch.inserts.keys() {
            operations.push(ViewOperation::InsertItem(IndexPath::new(*post_s, *idx)));
        }
    }

    for (post_s, ch) in &changes {
        if let Some((from, to)) = ch.sole_move() {
            operations.push(ViewOperation::MoveItem {
                from: IndexPath::new(*post_s, from),
                to: IndexPath::new(*post_s, to),
            });
        }
    }

    for (post_s, ch) in &changes {
        for (pre_i, item) in &ch.updates_to_emit {
            let removed_below = ch.removals.range(..*pre_i).count();
            let path = IndexPath::new(*post_s, pre_i - removed_below);
            operations.push(ViewOperation::UpdateItem(path));
            updated_items.push((path, item.clone()));
        }
    }

    debug!(
        txn_id = %txn.id,
        event_count = txn.len(),
        op_count = operations.len(),
        "transaction reconciled"
    );

    Ok(ReconcileOutcome {
        operations,
        snapshot: advanced,
        updated_items,
    })
}
