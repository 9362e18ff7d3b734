use rowsync_core::{
    CellConfigurator, Item, RenderTarget, Section, SectionSnapshot, ViewOperation,
};
use rowsync_core_types::{IndexPath, ItemKey, SectionKey};

/// Build a test item whose key and entity payload are both `name`
#[allow(dead_code)]
pub fn item(name: &str) -> Item {
    Item::new(
        ItemKey::from_string(name.to_string()),
        serde_json::json!(name),
    )
}

/// Build a snapshot from nested item names, one inner slice per section
#[allow(dead_code)]
pub fn snapshot_of(sections: &[&[&str]]) -> SectionSnapshot {
    SectionSnapshot::from_sections(
        sections
            .iter()
            .enumerate()
            .map(|(i, names)| {
                Section::with_items(
                    SectionKey::from_string(format!("s{}", i)),
                    names.iter().map(|n| item(n)).collect(),
                )
            })
            .collect(),
    )
}

/// Extract the entity text of every item, section by section
#[allow(dead_code)]
pub fn texts_of(snapshot: &SectionSnapshot) -> Vec<Vec<String>> {
    snapshot
        .sections
        .iter()
        .map(|s| {
            s.items
                .iter()
                .map(|i| i.entity.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .collect()
}

/// An in-memory sectioned view that replays operations literally.
///
/// Cells are plain strings holding whatever the configurator last wrote.
/// Structural operations are applied exactly as received, so any ordering
/// mistake in the reconciled sequence shows up as an index panic or a
/// content mismatch against the advanced snapshot.
pub struct MirrorTarget {
    pub sections: Vec<Vec<String>>,
    in_batch: bool,
    pub batches: usize,
    pub reloads: usize,
}

impl MirrorTarget {
    /// An empty view, as before the initial load
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            in_batch: false,
            batches: 0,
            reloads: 0,
        }
    }

    /// A view already rendered to match the given item names
    #[allow(dead_code)]
    pub fn rendered(sections: &[&[&str]]) -> Self {
        Self {
            sections: sections
                .iter()
                .map(|names| names.iter().map(|n| n.to_string()).collect())
                .collect(),
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
            // content arrives through the configuration pass
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
