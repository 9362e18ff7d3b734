//! Table Sync Demonstration
//!
//! This example walks the full controller lifecycle against a console view.
//!
//! Key concepts illustrated:
//! 1. Initial load from a query provider
//! 2. Transaction framing (begin/record/end)
//! 3. Incremental batches vs full-reload fallbacks
//! 4. Recovery from a stale transaction

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rowsync_core::{
    CellConfigurator, ChangeEvent, Item, RenderTarget, Section, SectionSnapshot, ViewOperation,
};
use rowsync_core_types::{IndexPath, ItemKey, SectionKey};
use rowsync_engine::{MemoryQueryProvider, SyncController};

/// A console "table view": one Vec of styled lines per section
struct ConsoleView {
    sections: Vec<Vec<String>>,
    batches: usize,
    reloads: usize,
}

impl ConsoleView {
    fn new() -> Self {
        Self {
            sections: Vec::new(),
            batches: 0,
            reloads: 0,
        }
    }

    fn print(&self) {
        for (s, rows) in self.sections.iter().enumerate() {
            println!("  section {}:", s);
            for row in rows {
                println!("    - {}", row);
            }
        }
        println!(
            "  ({} batch(es), {} reload(s))\n",
            self.batches, self.reloads
        );
    }
}

impl RenderTarget for ConsoleView {
    type Cell = String;

    fn section_count(&self) -> usize {
        self.sections.len()
    }

    fn item_count(&self, section: usize) -> usize {
        self.sections.get(section).map(Vec::len).unwrap_or(0)
    }

    fn begin_batch(&mut self) {
        self.batches += 1;
    }

    fn end_batch(&mut self) {}

    fn apply_operation(&mut self, op: &ViewOperation) {
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
            ViewOperation::FullReload => {}
        }
    }

    fn cell_mut(&mut self, path: IndexPath) -> Option<&mut String> {
        self.sections
            .get_mut(path.section)
            .and_then(|s| s.get_mut(path.item))
    }

    fn full_reload(&mut self, snapshot: &SectionSnapshot) {
        self.reloads += 1;
        self.sections = snapshot
            .sections
            .iter()
            .map(|s| vec![String::new(); s.items.len()])
            .collect();
    }
}

struct TitleConfigurator;

impl CellConfigurator<String> for TitleConfigurator {
    fn configure(&self, cell: &mut String, item: &Item) {
        *cell = item.entity.as_str().unwrap_or_default().to_string();
    }
}

fn named(name: &str) -> Item {
    Item::new(
        ItemKey::from_string(name.to_string()),
        serde_json::json!(name),
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== RowSync Table Demo ===\n");

    // ===== Part 1: Initial Load =====
    println!("## Part 1: Initial Load\n");

    let provider = MemoryQueryProvider::new(vec![
        Section::with_items(
            SectionKey::from_string("inbox".to_string()),
            vec![named("Write report"), named("Review PR")],
        ),
        Section::with_items(
            SectionKey::from_string("done".to_string()),
            vec![named("Ship release")],
        ),
    ]);

    let mut controller = SyncController::new(provider);
    let mut view = ConsoleView::new();
    let configurator = TitleConfigurator;

    controller.initial_load(&mut view, &configurator)?;
    println!("Loaded backing collection:");
    view.print();

    // ===== Part 2: Incremental Transaction =====
    println!("## Part 2: Incremental Transaction\n");

    let txn_id = controller.begin_changes()?;
    println!("Opened transaction {}", txn_id);

    controller.record_change(ChangeEvent::DeleteItem {
        path: IndexPath::new(0, 0),
    })?;
    controller.record_change(ChangeEvent::InsertItem {
        path: IndexPath::new(0, 1),
        item: named("Plan sprint"),
    })?;
    controller.end_changes(&mut view, &configurator)?;

    println!("After delete 'Write report' + insert 'Plan sprint':");
    view.print();

    // ===== Part 3: Conservative Fallback =====
    println!("## Part 3: Conservative Fallback\n");

    controller.begin_changes()?;
    controller.record_change(ChangeEvent::MoveItem {
        from: IndexPath::new(0, 0),
        to: IndexPath::new(1, 1),
    })?;
    controller.end_changes(&mut view, &configurator)?;

    println!("A cross-section move becomes a full reload:");
    view.print();

    // ===== Part 4: Stale Transaction Recovery =====
    println!("## Part 4: Stale Transaction Recovery\n");

    controller.begin_changes()?;
    controller.record_change(ChangeEvent::DeleteItem {
        path: IndexPath::new(0, 99),
    })?;
    controller.end_changes(&mut view, &configurator)?;

    println!("A stale index re-fetched the backing collection:");
    view.print();

    println!("=== Demo complete ===");
    Ok(())
}
