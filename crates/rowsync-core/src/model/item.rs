use rowsync_core_types::ItemKey;
use serde::{Deserialize, Serialize};

/// Item - an opaque reference to a domain entity plus its stable identity
///
/// The entity payload is deliberately untyped: the kernel never inspects it
/// beyond equality, and the `CellConfigurator` is the only consumer of its
/// content. The key stays stable across transactions even while the item's
/// index position changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identity, usable as a map key across transactions
    pub key: ItemKey,

    /// Opaque domain entity payload
    pub entity: serde_json::Value,
}

impl Item {
    /// Create a new Item with the given key and entity payload
    pub fn new(key: ItemKey, entity: serde_json::Value) -> Self {
        Self { key, entity }
    }

    /// Create an Item with a freshly generated key
    pub fn with_entity(entity: serde_json::Value) -> Self {
        Self {
            key: ItemKey::new(),
            entity,
        }
    }
}
