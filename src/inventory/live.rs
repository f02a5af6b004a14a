//! Live inventory state keyed by resolved item handles.

use crate::catalog::ItemRef;
use crate::slots::SlotConfig;
use crate::types::{ItemRecord, ItemSlot, ItemType};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Items owned in this session plus the slot map.
///
/// The slot map's keys are fixed when the inventory is built from a
/// [`SlotConfig`]; only their values change afterwards. Every occupied slot
/// holds an item that has a record in `items`.
#[derive(Clone, Debug, Default)]
pub struct LiveInventory {
    pub(crate) items: IndexMap<ItemRef, ItemRecord>,
    pub(crate) slots: BTreeMap<ItemSlot, Option<ItemRef>>,
}

impl LiveInventory {
    /// Empty inventory with every configured slot present and empty.
    pub fn with_slots(config: &SlotConfig) -> Self {
        Self {
            items: IndexMap::new(),
            slots: config.slots().map(|slot| (slot, None)).collect(),
        }
    }

    /// Owned items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = (&ItemRef, &ItemRecord)> {
        self.items.iter()
    }

    /// Every slot in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (&ItemSlot, Option<&ItemRef>)> {
        self.slots.iter().map(|(slot, item)| (slot, item.as_ref()))
    }

    pub fn record(&self, item: &ItemRef) -> Option<&ItemRecord> {
        self.items.get(item)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn has_slot(&self, slot: &ItemSlot) -> bool {
        self.slots.contains_key(slot)
    }

    /// Slot currently holding `item`, if any.
    pub fn slot_of(&self, item: &ItemRef) -> Option<&ItemSlot> {
        self.slots
            .iter()
            .find(|(_, occupant)| occupant.as_ref() == Some(item))
            .map(|(slot, _)| slot)
    }

    /// Owned items, optionally restricted to one type.
    pub fn items_of_type<'a>(&'a self, item_type: Option<&'a ItemType>) -> impl Iterator<Item = &'a ItemRef> {
        self.items
            .keys()
            .filter(move |item| item_type.map_or(true, |t| item.item_type() == t))
    }
}
