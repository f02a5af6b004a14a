//! # Satchel
//!
//! A per-player session inventory with typed slot bindings and a save layer
//! that survives format changes and bursts of writes.
//!
//! ## Core Concepts
//!
//! - **Inventory**: Owned items with a count and level, keyed by resolved item handles
//! - **Slots**: A fixed, typed set of binding sites, each holding at most one owned item
//! - **Snapshots**: The durable projection of the inventory, keyed by item identity
//! - **Gateway**: Loads and migrates snapshots, and keeps at most one write in flight
//!
//! ## Example
//!
//! ```ignore
//! use satchel::{InventoryConfig, InventoryStore, PersistenceGateway};
//! use std::sync::Arc;
//!
//! let setup = InventoryConfig::from_path("setup.json")?;
//! let gateway = PersistenceGateway::open_file(setup.gateway_config())?.into_shared();
//! gateway.lock().load();
//!
//! let mut store = InventoryStore::new(Arc::new(setup.catalog()), setup.slot_config())
//!     .with_gateway(gateway.clone());
//! store.hydrate();
//!
//! // Add a sword and bind it to the first free weapon slot
//! store.add_item_by_id(&"Weapon:Sword".parse()?, 1, 1, true);
//!
//! // Once per tick
//! gateway.lock().pump();
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod inventory;
pub mod persistence;
pub mod slots;
pub mod types;

// Re-exports
pub use catalog::{ItemCatalog, ItemDefinition, ItemMetadata, ItemRef, StaticCatalog};
pub use config::{DefaultItem, InventoryConfig};
pub use error::{InventoryError, Result};
pub use events::{
    EventFilter, InventoryEvent, ObserverId, ObserverList, SubscriptionConfig, SubscriptionHandle,
};
pub use inventory::{InventoryStore, LiveInventory};
pub use persistence::{
    migrate, DurableSnapshot, FileBackend, GatewayConfig, MemoryBackend, PersistenceGateway,
    SaveBackend, SaveStats, SharedGateway,
};
pub use slots::{find_slot_for, SlotAssignment, SlotConfig};
pub use types::*;
