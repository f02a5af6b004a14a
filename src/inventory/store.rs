//! The inventory store: mutation, queries, notifications and save triggers.

use crate::catalog::{ItemCatalog, ItemRef};
use crate::events::{
    EventFilter, InventoryEvent, ObserverId, ObserverList, SubscriptionConfig, SubscriptionHandle,
};
use crate::persistence::{DurableSnapshot, SharedGateway};
use crate::slots::{find_slot_for, SlotAssignment, SlotConfig};
use crate::types::{ItemIdentity, ItemRecord, ItemSlot, ItemType};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::live::LiveInventory;

/// Owns one player's live inventory for a session.
///
/// The store starts unhydrated; every mutation is rejected until
/// [`InventoryStore::hydrate`] (or [`InventoryStore::hydrate_from`]) has run.
/// Successful mutations notify observers synchronously and then ask the
/// gateway, if one is attached, to persist a fresh snapshot.
pub struct InventoryStore {
    catalog: Arc<dyn ItemCatalog>,
    slot_config: SlotConfig,
    live: Option<LiveInventory>,
    observers: ObserverList,
    gateway: Option<SharedGateway>,
}

impl InventoryStore {
    /// Create an unhydrated store.
    pub fn new(catalog: Arc<dyn ItemCatalog>, slot_config: SlotConfig) -> Self {
        Self {
            catalog,
            slot_config,
            live: None,
            observers: ObserverList::new(),
            gateway: None,
        }
    }

    /// Attach the gateway used for hydration and saving.
    pub fn with_gateway(mut self, gateway: SharedGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn gateway(&self) -> Option<&SharedGateway> {
        self.gateway.as_ref()
    }

    pub fn slot_config(&self) -> &SlotConfig {
        &self.slot_config
    }

    pub fn is_hydrated(&self) -> bool {
        self.live.is_some()
    }

    /// Live state, once hydrated.
    pub fn live(&self) -> Option<&LiveInventory> {
        self.live.as_ref()
    }

    // --- Observers ---

    /// Register a synchronous callback.
    pub fn observe<F>(&mut self, filter: EventFilter, callback: F) -> ObserverId
    where
        F: FnMut(&InventoryEvent) + Send + 'static,
    {
        self.observers.add(filter, callback)
    }

    /// Register a bounded channel subscription.
    pub fn subscribe(&mut self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.observers.subscribe(config)
    }

    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    // --- Hydration ---

    /// Rebuild live state from the gateway's current snapshot.
    ///
    /// Without a gateway the store becomes hydrated but empty, and this
    /// returns false. `InventoryLoaded` fires either way.
    pub fn hydrate(&mut self) -> bool {
        let snapshot = self
            .gateway
            .as_ref()
            .map(|gateway| gateway.lock().snapshot().clone());

        match snapshot {
            Some(snapshot) => self.hydrate_from(&snapshot),
            None => {
                self.live = Some(LiveInventory::with_slots(&self.slot_config));
                self.observers.notify(&InventoryEvent::InventoryLoaded);
                false
            }
        }
    }

    /// Rebuild live state from `snapshot`, replacing whatever was there.
    ///
    /// Items the catalog cannot resolve are dropped, as are slot entries that
    /// are not valid for the current slot configuration or that name an item
    /// not in the inventory. If the snapshot held no usable slot entry at
    /// all, owned items are auto-slotted.
    pub fn hydrate_from(&mut self, snapshot: &DurableSnapshot) -> bool {
        let mut live = LiveInventory::with_slots(&self.slot_config);

        for (identity, record) in &snapshot.inventory {
            if !record.is_valid() {
                continue;
            }
            match self.catalog.resolve(identity) {
                Some(item) => {
                    live.items.insert(item, *record);
                }
                None => warn!(item = %identity, "dropping unknown item from save"),
            }
        }

        let mut found_any_slots = false;
        for (slot, identity) in &snapshot.slots {
            let Some(identity) = identity else { continue };
            if !self.slot_config.is_valid_slot(slot) {
                continue;
            }
            let Some(item) = self.catalog.resolve(identity) else {
                continue;
            };
            if !live.items.contains_key(&item) || live.slot_of(&item).is_some() {
                continue;
            }
            live.slots.insert(slot.clone(), Some(item));
            found_any_slots = true;
        }

        info!(
            items = live.items.len(),
            slotted = live.slots.values().filter(|item| item.is_some()).count(),
            "inventory hydrated"
        );
        self.live = Some(live);

        if !found_any_slots {
            self.fill_empty_slots();
        }

        self.observers.notify(&InventoryEvent::InventoryLoaded);
        true
    }

    // --- Mutation ---

    /// Add `count` of `item` at `level`.
    ///
    /// Counts accumulate up to the item's max count; the level is replaced
    /// (clamped to the item's max level). With `auto_slot`, the item is also
    /// placed into its lowest free slot. Returns true if the record or a slot
    /// changed, in which case a save is requested.
    ///
    /// `item` must resolve through the store's catalog; limits are taken from
    /// the catalog's definition.
    pub fn add_item(&mut self, item: &ItemRef, count: i32, level: i32, auto_slot: bool) -> bool {
        if count <= 0 || level <= 0 {
            warn!(item = %item.identity(), count, level, "add_item: non-positive count or level");
            return false;
        }
        let Some(resolved) = self.catalog.resolve(item.identity()) else {
            warn!(item = %item.identity(), "add_item: item not in catalog");
            return false;
        };
        let item = &resolved;
        let Some(live) = self.live.as_mut() else {
            warn!("add_item: inventory not hydrated");
            return false;
        };

        let old = live.items.get(item).copied().unwrap_or_else(ItemRecord::absent);
        let metadata = self.catalog.metadata_of(item);
        let new = old.merged_with(ItemRecord::new(count, level), metadata.max_count, metadata.max_level);

        let mut changed = false;
        if old != new {
            live.items.insert(item.clone(), new);
            debug!(item = %item.identity(), count = new.count, level = new.level, "item record updated");
            self.observers.notify(&InventoryEvent::ItemChanged {
                added: true,
                item: item.clone(),
            });
            changed = true;
        }

        if auto_slot {
            changed |= Self::fill_empty_slot_with_item(&mut live.slots, &mut self.observers, item);
        }

        if changed {
            self.save();
        }
        changed
    }

    /// Resolve `identity` through the catalog and add it.
    pub fn add_item_by_id(
        &mut self,
        identity: &ItemIdentity,
        count: i32,
        level: i32,
        auto_slot: bool,
    ) -> bool {
        match self.catalog.resolve(identity) {
            Some(item) => self.add_item(&item, count, level, auto_slot),
            None => {
                warn!(item = %identity, "add_item: unknown item");
                false
            }
        }
    }

    /// Remove `count` of `item`; `count <= 0` removes it entirely.
    ///
    /// An item whose count drops to zero is deleted and cleared from every
    /// slot holding it. Returns false if the item is not owned.
    pub fn remove_item(&mut self, item: &ItemRef, count: i32) -> bool {
        let Some(live) = self.live.as_mut() else {
            warn!("remove_item: inventory not hydrated");
            return false;
        };
        let Some(old) = live.items.get(item).copied().filter(ItemRecord::is_valid) else {
            return false;
        };

        let mut new = old;
        new.count = if count <= 0 { 0 } else { old.count.saturating_sub(count) };

        if new.count > 0 {
            live.items.insert(item.clone(), new);
        } else {
            live.items.shift_remove(item);
            for (slot, occupant) in live.slots.iter_mut() {
                if occupant.as_ref() == Some(item) {
                    *occupant = None;
                    self.observers.notify(&InventoryEvent::SlottedItemChanged {
                        slot: slot.clone(),
                        item: None,
                    });
                }
            }
        }

        debug!(item = %item.identity(), remaining = new.count.max(0), "item removed");
        self.observers.notify(&InventoryEvent::ItemChanged {
            added: false,
            item: item.clone(),
        });
        self.save();
        true
    }

    /// Put `item` into `slot`, or clear the slot with `None`.
    ///
    /// Any current occupant of `slot` is replaced, and `item` is taken out of
    /// whatever other slot held it. Fails for slots outside the configuration
    /// and for items that are not owned.
    pub fn set_slotted_item(&mut self, slot: &ItemSlot, item: Option<&ItemRef>) -> bool {
        let Some(live) = self.live.as_mut() else {
            warn!("set_slotted_item: inventory not hydrated");
            return false;
        };
        if !live.slots.contains_key(slot) {
            warn!(?slot, "set_slotted_item: unknown slot");
            return false;
        }
        if let Some(item) = item {
            if !live.items.contains_key(item) {
                warn!(item = %item.identity(), "set_slotted_item: item not owned");
                return false;
            }
        }

        for (key, occupant) in live.slots.iter_mut() {
            if key == slot {
                *occupant = item.cloned();
                self.observers.notify(&InventoryEvent::SlottedItemChanged {
                    slot: key.clone(),
                    item: item.cloned(),
                });
            } else if item.is_some() && occupant.as_ref() == item {
                *occupant = None;
                self.observers.notify(&InventoryEvent::SlottedItemChanged {
                    slot: key.clone(),
                    item: None,
                });
            }
        }

        self.save();
        true
    }

    /// Auto-slot every owned item, in inventory order. Issues at most one
    /// save request for the whole pass. Returns true if anything moved.
    pub fn fill_empty_slots(&mut self) -> bool {
        let Some(live) = self.live.as_mut() else {
            return false;
        };

        let mut should_save = false;
        for item in live.items.keys() {
            should_save |= Self::fill_empty_slot_with_item(&mut live.slots, &mut self.observers, item);
        }

        if should_save {
            self.save();
        }
        should_save
    }

    fn fill_empty_slot_with_item(
        slots: &mut BTreeMap<ItemSlot, Option<ItemRef>>,
        observers: &mut ObserverList,
        item: &ItemRef,
    ) -> bool {
        // An item placed in a slot of another type stays where it is
        if slots.values().any(|occupant| occupant.as_ref() == Some(item)) {
            return false;
        }

        match find_slot_for(item.item_type(), slots, item) {
            SlotAssignment::Assign(slot) => {
                slots.insert(slot.clone(), Some(item.clone()));
                debug!(item = %item.identity(), ?slot, "item auto-slotted");
                observers.notify(&InventoryEvent::SlottedItemChanged {
                    slot,
                    item: Some(item.clone()),
                });
                true
            }
            SlotAssignment::AlreadySlotted(_) | SlotAssignment::Unavailable => false,
        }
    }

    /// Derive a snapshot from live state and hand it to the gateway.
    ///
    /// Returns false without a gateway, before hydration, or when the
    /// gateway declines (saving disabled).
    pub fn save(&self) -> bool {
        let (Some(gateway), Some(live)) = (self.gateway.as_ref(), self.live.as_ref()) else {
            return false;
        };
        let catalog = self.catalog.as_ref();
        gateway
            .lock()
            .request_save(|snapshot| snapshot.derive_from(live, catalog))
    }

    // --- Queries ---

    /// Owned items, optionally only those of `item_type`. Order is unspecified.
    pub fn items(&self, item_type: Option<&ItemType>) -> Vec<ItemRef> {
        match &self.live {
            Some(live) => live.items_of_type(item_type).cloned().collect(),
            None => Vec::new(),
        }
    }

    /// How many of `item` are owned; 0 if none.
    pub fn item_count(&self, item: &ItemRef) -> i32 {
        self.item_record(item).map_or(0, |record| record.count)
    }

    pub fn item_record(&self, item: &ItemRef) -> Option<ItemRecord> {
        self.live.as_ref()?.record(item).copied()
    }

    /// Occupant of `slot`; `None` for empty or unknown slots.
    pub fn slotted_item(&self, slot: &ItemSlot) -> Option<ItemRef> {
        self.live.as_ref()?.slots.get(slot)?.clone()
    }

    /// Slot contents in slot order, optionally restricted to one type.
    /// Empty slots appear as `None` only when `include_empty` is set.
    pub fn slotted_items(&self, item_type: Option<&ItemType>, include_empty: bool) -> Vec<Option<ItemRef>> {
        let Some(live) = self.live.as_ref() else {
            return Vec::new();
        };
        live.slots
            .iter()
            .filter(|(slot, _)| item_type.map_or(true, |t| &slot.item_type == t))
            .filter(|(_, item)| include_empty || item.is_some())
            .map(|(_, item)| item.clone())
            .collect()
    }
}
