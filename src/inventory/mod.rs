//! Live session inventory: owned items, their records, and slot bindings.

mod live;
mod store;

pub use live::LiveInventory;
pub use store::InventoryStore;
