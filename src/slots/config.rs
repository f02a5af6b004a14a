//! Fixed per-type slot counts supplied by the game setup.

use crate::types::{ItemSlot, ItemType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of slots for each item type.
///
/// Defines the domain of every slot map built from it; slot `n` of type `T`
/// exists iff `0 <= n < count(T)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotConfig {
    slots_per_type: BTreeMap<ItemType, u32>,
}

impl SlotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`SlotConfig::set`].
    pub fn with_slots(mut self, item_type: impl Into<ItemType>, count: u32) -> Self {
        self.set(item_type, count);
        self
    }

    pub fn set(&mut self, item_type: impl Into<ItemType>, count: u32) {
        self.slots_per_type.insert(item_type.into(), count);
    }

    pub fn count_for(&self, item_type: &ItemType) -> u32 {
        self.slots_per_type.get(item_type).copied().unwrap_or(0)
    }

    /// True if `slot` is valid and inside the configured range for its type.
    pub fn is_valid_slot(&self, slot: &ItemSlot) -> bool {
        if !slot.is_valid() {
            return false;
        }
        match self.slots_per_type.get(&slot.item_type) {
            Some(&count) => (slot.slot_number as i64) < count as i64,
            None => false,
        }
    }

    /// Every configured slot, ordered by type then number.
    pub fn slots(&self) -> impl Iterator<Item = ItemSlot> + '_ {
        self.slots_per_type
            .iter()
            .filter(|(item_type, _)| item_type.is_valid())
            .flat_map(|(item_type, &count)| {
                (0..count.min(i32::MAX as u32) as i32).map(move |n| ItemSlot::new(item_type.clone(), n))
            })
    }

    pub fn total_slots(&self) -> usize {
        self.slots().count()
    }

    pub fn types(&self) -> impl Iterator<Item = &ItemType> {
        self.slots_per_type.keys()
    }
}
