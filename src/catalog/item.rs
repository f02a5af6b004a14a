//! Item definitions and the shared handle used by live inventory state.

use crate::types::{ItemIdentity, ItemType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

fn default_limit() -> i32 {
    1
}

/// Static description of an item, as loaded from game data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemIdentity,

    #[serde(default)]
    pub display_name: String,

    /// Maximum stack size; `<= 0` means unlimited.
    #[serde(default = "default_limit")]
    pub max_count: i32,

    /// Maximum level; `<= 0` means unlimited.
    #[serde(default = "default_limit")]
    pub max_level: i32,
}

impl ItemDefinition {
    pub fn new(id: ItemIdentity, max_count: i32, max_level: i32) -> Self {
        Self {
            display_name: id.name.clone(),
            id,
            max_count,
            max_level,
        }
    }

    /// Items without a stack limit are consumables.
    pub fn is_consumable(&self) -> bool {
        self.max_count <= 0
    }
}

/// Stacking and level limits for an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemMetadata {
    pub max_count: i32,
    pub max_level: i32,
}

/// Resolved, in-session handle to an item definition.
///
/// Cheap to clone. Two handles are equal iff they refer to the same
/// identity. Never persisted.
#[derive(Clone)]
pub struct ItemRef(Arc<ItemDefinition>);

impl ItemRef {
    /// Wrap a definition. Meant for [`ItemCatalog`] implementations; everyone
    /// else should obtain handles from [`ItemCatalog::resolve`], since the
    /// inventory only accepts items its catalog resolves.
    ///
    /// [`ItemCatalog`]: crate::catalog::ItemCatalog
    /// [`ItemCatalog::resolve`]: crate::catalog::ItemCatalog::resolve
    pub fn new(definition: ItemDefinition) -> Self {
        ItemRef(Arc::new(definition))
    }

    pub fn identity(&self) -> &ItemIdentity {
        &self.0.id
    }

    pub fn item_type(&self) -> &ItemType {
        &self.0.id.item_type
    }

    pub fn metadata(&self) -> ItemMetadata {
        ItemMetadata {
            max_count: self.0.max_count,
            max_level: self.0.max_level,
        }
    }
}

impl Deref for ItemRef {
    type Target = ItemDefinition;

    fn deref(&self) -> &ItemDefinition {
        &self.0
    }
}

impl PartialEq for ItemRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for ItemRef {}

impl Hash for ItemRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemRef({})", self.0.id)
    }
}
