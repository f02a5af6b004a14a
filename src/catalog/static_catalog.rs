//! In-memory catalog backed by a fixed set of item definitions.

use super::{ItemCatalog, ItemDefinition, ItemRef};
use crate::types::ItemIdentity;
use std::collections::HashMap;

/// Catalog holding every definition in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    items: HashMap<ItemIdentity, ItemRef>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from definitions. Later duplicates replace earlier ones.
    pub fn from_definitions(definitions: impl IntoIterator<Item = ItemDefinition>) -> Self {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.insert(definition);
        }
        catalog
    }

    /// Add a definition, returning its handle.
    pub fn insert(&mut self, definition: ItemDefinition) -> ItemRef {
        let item = ItemRef::new(definition);
        self.items.insert(item.identity().clone(), item.clone());
        item
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemRef> {
        self.items.values()
    }
}

impl ItemCatalog for StaticCatalog {
    fn resolve(&self, identity: &ItemIdentity) -> Option<ItemRef> {
        self.items.get(identity).cloned()
    }
}
