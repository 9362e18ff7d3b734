use std::cell::Cell;
use std::rc::Rc;

use rowsync_core::errors::{Result, RowSyncError};
use rowsync_core::{
    CellConfigurator, Item, RenderTarget, Section, SectionSnapshot, ViewOperation,
};
use rowsync_core_types::{IndexPath, ItemKey, SectionKey};
use rowsync_engine::{MemoryQueryProvider, QueryProvider, SortSpec};

/// Build a test item whose key and entity payload are both `name`
#[allow(dead_code)]
pub fn item(name: &str) -> Item {
    Item::new(
        ItemKey::from_string(name.to_string()),
        serde_json::json!(name),
    )
}

/// Build backing sections from nested item names
#[allow(dead_code)]
pub fn sections_of(sections: &[&[&str]]) -> Vec<Section> {
    sections
        .iter()
        .enumerate()
        .map(|(i, names)| {
            Section::with_items(
                SectionKey::from_string(format!("s{}", i)),
                names.iter().map(|n| item(n)).collect(),
            )
        })
        .collect()
}

/// A provider that fails while `failing` is set and otherwise delegates to
/// an in-memory provider. The shared flag lets tests flip behavior after the
/// controller has taken ownership.
pub struct FlakyProvider {
    inner: MemoryQueryProvider,
    failing: Rc<Cell<bool>>,
}

impl FlakyProvider {
    #[allow(dead_code)]
    pub fn new(sections: Vec<Section>) -> (Self, Rc<Cell<bool>>) {
        let failing = Rc::new(Cell::new(false));
        (
            Self {
                inner: MemoryQueryProvider::new(sections),
                failing: failing.clone(),
            },
            failing,
        )
    }
}

impl QueryProvider for FlakyProvider {
    fn fetch(&mut self, sort: &SortSpec, batch_size: usize) -> Result<SectionSnapshot> {
        if self.failing.get() {
            return Err(RowSyncError::QueryFailure {
                op: "fetch".to_string(),
                reason: "backing store unavailable".to_string(),
            });
        }
        self.inner.fetch(sort, batch_size)
    }
}

/// In-memory sectioned view replaying operations literally; see the
/// equivalent harness in the core crate's tests
pub struct MirrorTarget {
    pub sections: Vec<Vec<String>>,
    in_batch: bool,
    pub batches: usize,
    pub reloads: usize,
}

impl MirrorTarget {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            in_batch: false,
            batches: 0,
            reloads: 0,
        }
    }
}

impl RenderTarget for MirrorTarget {
    type Cell = String;

    fn section_count(&self) -> usize {
        self.sections.len()
    }

    fn item_count(&self, section: usize) -> usize {
        self.sections.get(section).map(Vec::len).unwrap_or(0)
    }

    fn begin_batch(&mut self) {
        assert!(!self.in_batch, "nested begin_batch");
        self.in_batch = true;
        self.batches += 1;
    }

    fn end_batch(&mut self) {
        assert!(self.in_batch, "end_batch without begin_batch");
        self.in_batch = false;
    }

    fn apply_operation(&mut self, op: &ViewOperation) {
        assert!(self.in_batch, "operation applied outside a batch");
        match op {
            ViewOperation::InsertItem(path) => {
                self.sections[path.section].insert(path.item, String::new());
            }
            ViewOperation::DeleteItem(path) => {
                self.sections[path.section].remove(path.item);
            }
            ViewOperation::UpdateItem(_) => {}
            ViewOperation::MoveItem { from, to } => {
                let cell = self.sections[from.section].remove(from.item);
                self.sections[to.section].insert(to.item, cell);
            }
            ViewOperation::InsertSection(index) => {
                self.sections.insert(*index, Vec::new());
            }
            ViewOperation::DeleteSection(index) => {
                self.sections.remove(*index);
            }
            ViewOperation::FullReload => {
                panic!("FullReload must never be applied inside a batch");
            }
        }
    }

    fn cell_mut(&mut self, path: IndexPath) -> Option<&mut String> {
        self.sections
            .get_mut(path.section)
            .and_then(|s| s.get_mut(path.item))
    }

    fn full_reload(&mut self, snapshot: &SectionSnapshot) {
        assert!(!self.in_batch, "full_reload during a batch");
        self.reloads += 1;
        self.sections = snapshot
            .sections
            .iter()
            .map(|s| vec![String::new(); s.items.len()])
            .collect();
    }
}

/// Writes each item's entity text into its cell
pub struct TextConfigurator;

impl CellConfigurator<String> for TextConfigurator {
    fn configure(&self, cell: &mut String, item: &Item) {
        *cell = item.entity.as_str().unwrap_or_default().to_string();
    }
}
