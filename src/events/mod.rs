//! Change notifications for inventory consumers.
//!
//! The store owns an ordered [`ObserverList`]. Every change is delivered
//! synchronously, in registration order, before the mutating call returns:
//! - item records added or removed
//! - slot contents changing
//! - the whole inventory being (re)loaded
//!
//! Observers come in two forms:
//! - callbacks, invoked inline
//! - channel subscriptions with a bounded buffer; a subscriber whose buffer
//!   overflows is dropped and sees its channel disconnect
//!
//! Callbacks only ever see the event, never the store, so a handler cannot
//! re-enter the store while a slot map walk is in progress.
//!
//! # Example
//!
//! ```ignore
//! let handle = store.subscribe(SubscriptionConfig {
//!     filter: EventFilter::slots(),
//!     ..Default::default()
//! });
//!
//! store.add_item(&sword, 1, 1, true);
//!
//! while let Ok(event) = handle.try_recv() {
//!     if let InventoryEvent::SlottedItemChanged { slot, item } = event {
//!         println!("{:?} -> {:?}", slot, item);
//!     }
//! }
//! ```

mod observers;
mod types;

pub use observers::ObserverList;
pub use types::{EventFilter, InventoryEvent, ObserverId, SubscriptionConfig, SubscriptionHandle};
