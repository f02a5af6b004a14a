//! Property tests for inventory invariants under arbitrary operation sequences.

use proptest::prelude::*;
use satchel::{
    InventoryStore, ItemCatalog, ItemDefinition, ItemIdentity, ItemRecord, ItemRef, ItemSlot,
    SlotConfig, StaticCatalog,
};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone, Debug)]
enum Op {
    Add { item: usize, count: i32, level: i32, auto_slot: bool },
    Remove { item: usize, count: i32 },
    Slot { slot: usize, item: Option<usize> },
    FillEmptySlots,
}

fn items() -> Vec<ItemDefinition> {
    vec![
        ItemDefinition::new(ItemIdentity::new("Weapon", "Axe"), 1, 5),
        ItemDefinition::new(ItemIdentity::new("Weapon", "Sword"), 1, 5),
        ItemDefinition::new(ItemIdentity::new("Weapon", "Bow"), 1, 5),
        ItemDefinition::new(ItemIdentity::new("Potion", "Health"), 5, 3),
        ItemDefinition::new(ItemIdentity::new("Potion", "Mana"), 0, 0),
        ItemDefinition::new(ItemIdentity::new("Skill", "Fireball"), 1, 3),
    ]
}

fn slot_list() -> Vec<ItemSlot> {
    vec![
        ItemSlot::new("Weapon", 0),
        ItemSlot::new("Weapon", 1),
        ItemSlot::new("Potion", 0),
        ItemSlot::new("Skill", 0),
        // Not configured
        ItemSlot::new("Skill", 1),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..6usize, -2..8i32, -1..6i32, any::<bool>())
            .prop_map(|(item, count, level, auto_slot)| Op::Add { item, count, level, auto_slot }),
        (0..6usize, -1..4i32).prop_map(|(item, count)| Op::Remove { item, count }),
        (0..5usize, proptest::option::of(0..6usize)).prop_map(|(slot, item)| Op::Slot { slot, item }),
        Just(Op::FillEmptySlots),
    ]
}

fn store_with(catalog: &StaticCatalog) -> InventoryStore {
    let slots = SlotConfig::new()
        .with_slots("Weapon", 2)
        .with_slots("Potion", 1)
        .with_slots("Skill", 1);
    let mut store = InventoryStore::new(Arc::new(catalog.clone()), slots);
    store.hydrate();
    store
}

fn resolve(catalog: &StaticCatalog, identity: &ItemIdentity) -> ItemRef {
    catalog.resolve(identity).unwrap()
}

fn check_invariants(store: &InventoryStore, refs: &[ItemRef]) {
    let live = store.live().unwrap();

    for item in refs {
        if let Some(record) = live.record(item) {
            assert!(record.count >= 1, "{:?} has count {}", item, record.count);
            assert!(record.level >= 1);
            if item.max_count > 0 {
                assert!(record.count <= item.max_count);
            }
            if item.max_level > 0 {
                assert!(record.level <= item.max_level);
            }
        }
    }

    let mut seen = HashSet::new();
    for (_, occupant) in live.slots() {
        if let Some(item) = occupant {
            assert!(live.record(item).is_some(), "slotted {:?} is not owned", item);
            assert!(seen.insert(item.clone()), "{:?} occupies two slots", item);
        }
    }

    // Slot domain never changes after hydration
    assert_eq!(live.slots().count(), 4);
}

proptest! {
    #[test]
    fn inventory_invariants_hold(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let catalog = StaticCatalog::from_definitions(items());
        let refs: Vec<ItemRef> = items()
            .iter()
            .map(|def| resolve(&catalog, &def.id))
            .collect();
        let slots = slot_list();
        let mut store = store_with(&catalog);

        for op in ops {
            match op {
                Op::Add { item, count, level, auto_slot } => {
                    store.add_item(&refs[item], count, level, auto_slot);
                }
                Op::Remove { item, count } => {
                    store.remove_item(&refs[item], count);
                }
                Op::Slot { slot, item } => {
                    store.set_slotted_item(&slots[slot], item.map(|i| &refs[i]));
                }
                Op::FillEmptySlots => {
                    store.fill_empty_slots();
                }
            }
            check_invariants(&store, &refs);
        }
    }

    #[test]
    fn add_accumulates_and_clamps(
        first in 1..10i32,
        second in 1..10i32,
        level in 1..10i32,
    ) {
        let catalog = StaticCatalog::from_definitions(items());
        let potion = resolve(&catalog, &ItemIdentity::new("Potion", "Health"));
        let mut store = store_with(&catalog);

        store.add_item(&potion, first, 1, false);
        store.add_item(&potion, second, level, false);

        prop_assert_eq!(
            store.item_record(&potion),
            Some(ItemRecord::new((first + second).min(5), level.min(3)))
        );
    }

    #[test]
    fn removing_everything_clears_slots(count in 1..5i32) {
        let catalog = StaticCatalog::from_definitions(items());
        let potion = resolve(&catalog, &ItemIdentity::new("Potion", "Health"));
        let mut store = store_with(&catalog);

        store.add_item(&potion, count, 1, true);
        prop_assert!(store.remove_item(&potion, count));
        prop_assert_eq!(store.item_count(&potion), 0);
        prop_assert_eq!(store.slotted_item(&ItemSlot::new("Potion", 0)), None);
    }
}
