//! The durable, serializable projection of an inventory.

use crate::catalog::ItemCatalog;
use crate::inventory::LiveInventory;
use crate::types::{FormatVersion, ItemIdentity, ItemRecord, ItemSlot};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of an inventory keyed by durable identities.
///
/// This is a plain value: writes capture a copy of it, never a live alias.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableSnapshot {
    /// Owned items and their records.
    #[serde(default)]
    pub inventory: IndexMap<ItemIdentity, ItemRecord>,

    /// Slot bindings; every configured slot is present, possibly empty.
    #[serde(default)]
    pub slots: BTreeMap<ItemSlot, Option<ItemIdentity>>,

    /// Owning user.
    #[serde(default)]
    pub user_id: String,

    /// Version the data was written with. Blobs without one predate versioning.
    #[serde(default)]
    pub format_version: u32,

    /// Pre-record inventory: a flat list of owned items. Only ever read;
    /// migration folds it into `inventory` and empties it.
    #[serde(default, rename = "inventory_items", skip_serializing_if = "Vec::is_empty")]
    pub legacy_items: Vec<ItemIdentity>,
}

impl DurableSnapshot {
    /// Empty snapshot at the latest format version.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            inventory: IndexMap::new(),
            slots: BTreeMap::new(),
            user_id: user_id.into(),
            format_version: FormatVersion::LATEST.as_u32(),
            legacy_items: Vec::new(),
        }
    }

    /// Snapshot as written before structured records existed.
    pub fn legacy(user_id: impl Into<String>, items: Vec<ItemIdentity>, version: FormatVersion) -> Self {
        Self {
            format_version: version.as_u32(),
            legacy_items: items,
            ..Self::new(user_id)
        }
    }

    /// Known format version, if the stored number is one.
    pub fn version(&self) -> Option<FormatVersion> {
        FormatVersion::from_u32(self.format_version)
    }

    pub fn is_latest(&self) -> bool {
        self.format_version == FormatVersion::LATEST.as_u32()
    }

    /// Recompute `inventory` and `slots` from live state.
    ///
    /// Items without a resolvable identity are skipped; a slot holding one is
    /// stored as empty.
    pub fn derive_from(&mut self, live: &LiveInventory, catalog: &dyn ItemCatalog) {
        self.inventory.clear();
        self.slots.clear();

        for (item, record) in live.items() {
            if let Some(identity) = catalog.identity_of(item) {
                self.inventory.insert(identity, *record);
            }
        }

        for (slot, occupant) in live.slots() {
            let identity = occupant.and_then(|item| catalog.identity_of(item));
            self.slots.insert(slot.clone(), identity);
        }
    }

    /// Add `defaults` that are not already owned. With `remove_extra`, the
    /// inventory is cleared first.
    pub fn add_default_inventory(
        &mut self,
        defaults: &IndexMap<ItemIdentity, ItemRecord>,
        remove_extra: bool,
    ) {
        if remove_extra {
            self.inventory.clear();
        }
        for (identity, record) in defaults {
            self.inventory.entry(identity.clone()).or_insert(*record);
        }
    }
}

impl Default for DurableSnapshot {
    fn default() -> Self {
        Self::new(String::new())
    }
}
