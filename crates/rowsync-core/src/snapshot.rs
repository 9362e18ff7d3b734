//! Engine-owned snapshot of the sectioned collection
//!
//! The snapshot is created empty at engine initialization, replaced wholesale
//! on the first successful fetch, and incrementally advanced by each
//! reconciled transaction. Only the reconciler mutates it, and only at
//! transaction boundaries; external code reads it between transactions.
//!
//! Not thread-safe (no Arc/RwLock) - designed for single-threaded use on the
//! thread that owns the rendered view.

use chrono::{DateTime, Utc};
use rowsync_core_types::IndexPath;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RowSyncError};
use crate::model::{Item, Section};

/// Ordered, sectioned snapshot of the backing collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSnapshot {
    /// Sections in display order
    pub sections: Vec<Section>,

    /// When this snapshot was fetched or last advanced
    pub fetched_at: DateTime<Utc>,
}

impl SectionSnapshot {
    /// Create an empty snapshot (engine initialization state)
    pub fn empty() -> Self {
        Self {
            sections: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Create a snapshot from fetched sections
    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self {
            sections,
            fetched_at: Utc::now(),
        }
    }

    /// Number of sections
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Number of items in the given section
    ///
    /// # Errors
    ///
    /// Returns `StaleSectionIndex` if the section index is out of bounds.
    pub fn item_count(&self, section: usize) -> Result<usize> {
        Ok(self.section_at(section)?.items.len())
    }

    /// Get a section by index
    ///
    /// # Errors
    ///
    /// Returns `StaleSectionIndex` if the section index is out of bounds.
    pub fn section_at(&self, section: usize) -> Result<&Section> {
        self.sections
            .get(section)
            .ok_or_else(|| RowSyncError::StaleSectionIndex {
                event: "section_at".to_string(),
                section,
                bound: self.sections.len(),
            })
    }

    /// Get an item by path
    ///
    /// # Errors
    ///
    /// Returns `StaleSectionIndex` or `StaleItemIndex` if the path is out of
    /// bounds.
    pub fn item_at(&self, path: IndexPath) -> Result<&Item> {
        let section = self.section_at(path.section)?;
        section
            .items
            .get(path.item)
            .ok_or_else(|| RowSyncError::StaleItemIndex {
                event: "item_at".to_string(),
                section: path.section,
                item: path.item,
                bound: section.items.len(),
            })
    }

    /// Total number of items across all sections
    pub fn total_items(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// Iterate every valid path in display order
    pub fn paths(&self) -> impl Iterator<Item = IndexPath> + '_ {
        self.sections.iter().enumerate().flat_map(|(s, section)| {
            (0..section.items.len()).map(move |i| IndexPath::new(s, i))
        })
    }
}

impl Default for SectionSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
