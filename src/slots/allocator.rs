//! Picks the slot an item should be bound to.

use crate::types::{ItemSlot, ItemType};
use std::collections::BTreeMap;

/// Outcome of a slot search.
///
/// `AlreadySlotted` is a successful no-op; `Unavailable` is a failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotAssignment {
    /// The item already occupies this slot of the requested type.
    AlreadySlotted(ItemSlot),
    /// The lowest-numbered empty slot of the requested type.
    Assign(ItemSlot),
    /// Every slot of the requested type is occupied (or none exist).
    Unavailable,
}

/// Find where `item` should go among the slots of `item_type`.
///
/// If the item already sits in a slot of that type, nothing needs to move.
/// Otherwise the empty slot with the smallest slot number wins.
pub fn find_slot_for<T: PartialEq>(
    item_type: &ItemType,
    slots: &BTreeMap<ItemSlot, Option<T>>,
    item: &T,
) -> SlotAssignment {
    let mut best: Option<&ItemSlot> = None;

    for (slot, occupant) in slots {
        if &slot.item_type != item_type {
            continue;
        }
        match occupant {
            Some(current) if current == item => {
                return SlotAssignment::AlreadySlotted(slot.clone());
            }
            None => {
                if best.map_or(true, |b| slot.slot_number < b.slot_number) {
                    best = Some(slot);
                }
            }
            Some(_) => {}
        }
    }

    match best {
        Some(slot) => SlotAssignment::Assign(slot.clone()),
        None => SlotAssignment::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weapon() -> ItemType {
        ItemType::from("Weapon")
    }

    fn slot_map(entries: &[(&str, i32, Option<&'static str>)]) -> BTreeMap<ItemSlot, Option<&'static str>> {
        entries
            .iter()
            .map(|(t, n, v)| (ItemSlot::new(*t, *n), *v))
            .collect()
    }

    #[test]
    fn test_lowest_empty_slot_wins() {
        let slots = slot_map(&[
            ("Weapon", 0, Some("axe")),
            ("Weapon", 1, None),
            ("Weapon", 2, None),
        ]);
        assert_eq!(
            find_slot_for(&weapon(), &slots, &"sword"),
            SlotAssignment::Assign(ItemSlot::new("Weapon", 1))
        );
    }

    #[test]
    fn test_already_slotted_short_circuits() {
        // Empty slot 0 exists, but the item already holds slot 2
        let slots = slot_map(&[
            ("Weapon", 0, None),
            ("Weapon", 1, Some("axe")),
            ("Weapon", 2, Some("sword")),
        ]);
        assert_eq!(
            find_slot_for(&weapon(), &slots, &"sword"),
            SlotAssignment::AlreadySlotted(ItemSlot::new("Weapon", 2))
        );
    }

    #[test]
    fn test_other_types_ignored() {
        let slots = slot_map(&[
            ("Potion", 0, None),
            ("Weapon", 0, Some("axe")),
        ]);
        assert_eq!(find_slot_for(&weapon(), &slots, &"sword"), SlotAssignment::Unavailable);

        // Slotted under another type does not count as already slotted
        let slots = slot_map(&[("Potion", 0, Some("sword")), ("Weapon", 0, None)]);
        assert_eq!(
            find_slot_for(&weapon(), &slots, &"sword"),
            SlotAssignment::Assign(ItemSlot::new("Weapon", 0))
        );
    }

    #[test]
    fn test_no_slots_configured() {
        let slots: BTreeMap<ItemSlot, Option<&str>> = BTreeMap::new();
        assert_eq!(find_slot_for(&weapon(), &slots, &"sword"), SlotAssignment::Unavailable);
    }
}
