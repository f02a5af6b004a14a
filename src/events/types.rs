//! Event and subscription types.

use crate::catalog::ItemRef;
use crate::types::{ItemSlot, ItemType};

/// A change observed on the live inventory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InventoryEvent {
    /// An item record changed. `added` is false for removals.
    ItemChanged { added: bool, item: ItemRef },

    /// A slot's content changed; `None` means the slot was cleared.
    SlottedItemChanged { slot: ItemSlot, item: Option<ItemRef> },

    /// The inventory was replaced wholesale by hydration.
    InventoryLoaded,
}

impl InventoryEvent {
    /// Item type the event concerns, if any.
    pub fn item_type(&self) -> Option<&ItemType> {
        match self {
            InventoryEvent::ItemChanged { item, .. } => Some(item.item_type()),
            InventoryEvent::SlottedItemChanged { slot, .. } => Some(&slot.item_type),
            InventoryEvent::InventoryLoaded => None,
        }
    }
}

/// Which events an observer wants.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    /// Restrict item and slot events to one type (None = all types).
    pub item_type: Option<ItemType>,

    /// Include item record events.
    pub include_items: bool,

    /// Include slot events.
    pub include_slots: bool,

    /// Include inventory loaded events.
    pub include_loaded: bool,
}

impl EventFilter {
    /// Every event.
    pub fn all() -> Self {
        Self {
            include_items: true,
            include_slots: true,
            include_loaded: true,
            ..Default::default()
        }
    }

    /// Item record events only.
    pub fn items() -> Self {
        Self {
            include_items: true,
            ..Default::default()
        }
    }

    /// Slot events only.
    pub fn slots() -> Self {
        Self {
            include_slots: true,
            ..Default::default()
        }
    }

    /// Narrow an existing filter to one item type.
    pub fn for_type(mut self, item_type: impl Into<ItemType>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    pub fn matches(&self, event: &InventoryEvent) -> bool {
        let wanted = match event {
            InventoryEvent::ItemChanged { .. } => self.include_items,
            InventoryEvent::SlottedItemChanged { .. } => self.include_slots,
            InventoryEvent::InventoryLoaded => return self.include_loaded,
        };
        if !wanted {
            return false;
        }

        match (&self.item_type, event.item_type()) {
            (Some(wanted_type), Some(event_type)) => wanted_type == event_type,
            _ => true,
        }
    }
}

/// Configuration for a channel subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before the subscriber is dropped.
    /// Default: 1024
    pub buffer_size: usize,

    /// Filter criteria.
    pub filter: EventFilter,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            filter: EventFilter::all(),
        }
    }
}

/// Identifier for a registered observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Receiving end of a channel subscription.
pub struct SubscriptionHandle {
    pub id: ObserverId,
    pub receiver: crossbeam_channel::Receiver<InventoryEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<InventoryEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<InventoryEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain everything currently buffered.
    pub fn drain(&self) -> Vec<InventoryEvent> {
        self.receiver.try_iter().collect()
    }
}
