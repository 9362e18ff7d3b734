//! Query provider seam.
//!
//! The engine never fetches the backing collection itself: a `QueryProvider`
//! hands it sectioned snapshots on demand. `MemoryQueryProvider` is the
//! reference implementation backing the tests and demos.

use rowsync_core::errors::Result;
use rowsync_core::{Section, SectionSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Default fetch granularity hint handed to providers
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// One sort key with direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Entity field to compare
    pub key: String,
    pub ascending: bool,
}

impl SortField {
    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ascending: true,
        }
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ascending: false,
        }
    }
}

/// Ordered list of sort keys, applied within each section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub fields: Vec<SortField>,
}

impl SortSpec {
    pub fn new(fields: Vec<SortField>) -> Self {
        Self { fields }
    }

    /// Keep the provider's natural order
    pub fn unsorted() -> Self {
        Self { fields: Vec::new() }
    }
}

/// Source of sectioned snapshots.
///
/// `batch_size` is a fetch-granularity hint; providers backed by a paging
/// store use it, in-memory ones are free to ignore it.
pub trait QueryProvider {
    /// Fetch the current state of the backing collection
    ///
    /// # Errors
    ///
    /// Returns a `QueryFailure`-kind error when the backing store cannot be
    /// read. The controller degrades to an empty snapshot in that case.
    fn fetch(&mut self, sort: &SortSpec, batch_size: usize) -> Result<SectionSnapshot>;
}

/// In-memory provider over a fixed set of sections
#[derive(Debug, Clone, Default)]
pub struct MemoryQueryProvider {
    sections: Vec<Section>,
}

impl MemoryQueryProvider {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Replace the backing sections, as an external data change would
    pub fn set_sections(&mut self, sections: Vec<Section>) {
        self.sections = sections;
    }
}

impl QueryProvider for MemoryQueryProvider {
    fn fetch(&mut self, sort: &SortSpec, _batch_size: usize) -> Result<SectionSnapshot> {
        let mut sections = self.sections.clone();
        if !sort.fields.is_empty() {
            for section in &mut sections {
                section
                    .items
                    .sort_by(|a, b| compare_entities(&a.entity, &b.entity, sort));
            }
        }
        Ok(SectionSnapshot::from_sections(sections))
    }
}

fn compare_entities(a: &Value, b: &Value, sort: &SortSpec) -> Ordering {
    for field in &sort.fields {
        let left = a.get(&field.key).unwrap_or(&Value::Null);
        let right = b.get(&field.key).unwrap_or(&Value::Null);
        let ord = compare_values(left, right);
        let ord = if field.ascending { ord } else { ord.reverse() };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Total order over the JSON scalar types: null < bool < number < string.
/// Arrays and objects compare by their JSON text, which is stable enough for
/// a tie-break.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => {
            let by_rank = rank(a).cmp(&rank(b));
            if by_rank != Ordering::Equal {
                by_rank
            } else {
                a.to_string().cmp(&b.to_string())
            }
        }
    }
}
