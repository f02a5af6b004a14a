//! Version fixups applied to snapshots read from disk.

use crate::types::{FormatVersion, ItemRecord};
use tracing::{info, warn};

use super::snapshot::DurableSnapshot;

/// Bring a loaded snapshot up to [`FormatVersion::LATEST`].
///
/// Runs once, before the snapshot is handed to anyone. The result is always
/// stamped with the latest version and never carries the legacy item list.
pub fn migrate(mut snapshot: DurableSnapshot) -> DurableSnapshot {
    let latest = FormatVersion::LATEST.as_u32();
    let from = snapshot.format_version;

    if from < FormatVersion::AddedItemData.as_u32() {
        // Flat item list: every entry is one item at level one
        let legacy = std::mem::take(&mut snapshot.legacy_items);
        let converted = legacy.len();
        for identity in legacy {
            snapshot
                .inventory
                .entry(identity)
                .or_insert(ItemRecord::new(1, 1));
        }
        info!(from, to = latest, converted, "migrated legacy item list");
    } else if from > latest {
        warn!(from, latest, "save written by a newer format version");
    }

    snapshot.legacy_items.clear();
    snapshot.format_version = latest;
    snapshot
}
