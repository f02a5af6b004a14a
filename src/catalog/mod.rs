//! Item catalog: resolves durable identities to in-session item handles.
//!
//! The catalog is the only place that knows how an [`ItemIdentity`] maps to
//! a loaded item definition. Live inventory state is keyed by [`ItemRef`];
//! durable state is keyed by [`ItemIdentity`].
//!
//! [`ItemIdentity`]: crate::types::ItemIdentity

mod item;
mod static_catalog;

pub use item::{ItemDefinition, ItemMetadata, ItemRef};
pub use static_catalog::StaticCatalog;

use crate::types::ItemIdentity;

/// Resolves item identities for the inventory store and the save layer.
///
/// Implementations are injected at construction; there is no process-wide
/// catalog.
pub trait ItemCatalog: Send + Sync {
    /// Resolve a durable identity to a loaded item, if the catalog knows it.
    fn resolve(&self, identity: &ItemIdentity) -> Option<ItemRef>;

    /// Durable identity of a resolved item. Items without a valid identity
    /// yield `None` and are left out of saves.
    fn identity_of(&self, item: &ItemRef) -> Option<ItemIdentity> {
        let identity = item.identity();
        if identity.is_valid() {
            Some(identity.clone())
        } else {
            None
        }
    }

    /// Stacking and level limits of a resolved item.
    fn metadata_of(&self, item: &ItemRef) -> ItemMetadata {
        item.metadata()
    }
}
