use rowsync_core_types::SectionKey;
use serde::{Deserialize, Serialize};

use super::item::Item;

/// Section - an ordered sequence of items identified by a stable key
///
/// Sections themselves may be inserted and removed by transactions; the key
/// stays stable while the section's index changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Stable identity of this section (e.g. a group-by value)
    pub key: SectionKey,

    /// Items in display order
    pub items: Vec<Item>,
}

impl Section {
    /// Create a new empty section with the given key
    pub fn new(key: SectionKey) -> Self {
        Self {
            key,
            items: Vec::new(),
        }
    }

    /// Create a section with the given key and items
    pub fn with_items(key: SectionKey, items: Vec<Item>) -> Self {
        Self { key, items }
    }

    /// Number of items in this section
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if this section holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
