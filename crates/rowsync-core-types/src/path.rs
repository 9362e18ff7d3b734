//! Index paths into a sectioned collection
//!
//! An `IndexPath` addresses one item by section index and item index. Which
//! snapshot the indices are relative to (pre- or post-transaction) is a
//! property of the event or operation carrying the path, not of the path
//! itself.

use serde::{Deserialize, Serialize};

/// Position of an item inside a sectioned collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexPath {
    /// Index of the section
    pub section: usize,
    /// Index of the item within the section
    pub item: usize,
}

impl IndexPath {
    /// Create a new path from a section index and an item index
    pub fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }

    /// Return a copy with the item index replaced
    pub fn with_item(self, item: usize) -> Self {
        Self {
            section: self.section,
            item,
        }
    }

    /// Return a copy with the section index replaced
    pub fn with_section(self, section: usize) -> Self {
        Self {
            section,
            item: self.item,
        }
    }
}

impl std::fmt::Display for IndexPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}
