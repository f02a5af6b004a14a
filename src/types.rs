//! Core value types shared by live and durable inventory state.

use crate::error::InventoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Well-known item type tags.
pub mod item_types {
    pub const POTION: &str = "Potion";
    pub const SKILL: &str = "Skill";
    pub const TOKEN: &str = "Token";
    pub const WEAPON: &str = "Weapon";
}

/// Type tag partitioning items and slots (e.g. `Weapon`, `Potion`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemType(String);

impl ItemType {
    pub fn new(tag: impl Into<String>) -> Self {
        ItemType(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An unset (empty) tag is invalid.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl From<&str> for ItemType {
    fn from(tag: &str) -> Self {
        ItemType(tag.to_string())
    }
}

impl From<String> for ItemType {
    fn from(tag: String) -> Self {
        ItemType(tag)
    }
}

impl fmt::Debug for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemType({})", self.0)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Durable, catalog-independent key for an item definition.
///
/// Rendered and serialized as `"Type:Name"`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemIdentity {
    pub item_type: ItemType,
    pub name: String,
}

impl ItemIdentity {
    pub fn new(item_type: impl Into<ItemType>, name: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            name: name.into(),
        }
    }

    /// Both the type tag and the name must be set.
    pub fn is_valid(&self) -> bool {
        self.item_type.is_valid() && !self.name.is_empty()
    }
}

impl fmt::Debug for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemIdentity({}:{})", self.item_type, self.name)
    }
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.item_type, self.name)
    }
}

impl FromStr for ItemIdentity {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (item_type, name) = s
            .split_once(':')
            .ok_or_else(|| InventoryError::InvalidIdentity(s.to_string()))?;
        let identity = ItemIdentity::new(item_type, name);
        if !identity.is_valid() {
            return Err(InventoryError::InvalidIdentity(s.to_string()));
        }
        Ok(identity)
    }
}

impl TryFrom<String> for ItemIdentity {
    type Error = InventoryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ItemIdentity> for String {
    fn from(identity: ItemIdentity) -> Self {
        identity.to_string()
    }
}

/// Ownership of one item: how many, and at what shared level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRecord {
    pub count: i32,
    pub level: i32,
}

impl Default for ItemRecord {
    fn default() -> Self {
        Self { count: 1, level: 1 }
    }
}

impl ItemRecord {
    pub fn new(count: i32, level: i32) -> Self {
        Self { count, level }
    }

    /// Placeholder for an item that is not owned.
    pub fn absent() -> Self {
        Self { count: 0, level: 0 }
    }

    /// A record with `count <= 0` counts as absent.
    pub fn is_valid(&self) -> bool {
        self.count > 0
    }

    /// Combine with `delta`: counts accumulate, level is overridden.
    ///
    /// `max_count`/`max_level` of `<= 0` mean unbounded.
    pub fn merged_with(&self, delta: ItemRecord, max_count: i32, max_level: i32) -> ItemRecord {
        let max_count = if max_count <= 0 { i32::MAX } else { max_count };
        let max_level = if max_level <= 0 { i32::MAX } else { max_level };

        ItemRecord {
            count: self.count.saturating_add(delta.count).clamp(1, max_count),
            level: delta.level.clamp(1, max_level),
        }
    }
}

/// A typed, numbered binding site holding at most one item.
///
/// Ordered by type, then slot number.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemSlot {
    pub item_type: ItemType,
    pub slot_number: i32,
}

impl ItemSlot {
    pub fn new(item_type: impl Into<ItemType>, slot_number: i32) -> Self {
        Self {
            item_type: item_type.into(),
            slot_number,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.item_type.is_valid() && self.slot_number >= 0
    }
}

impl Default for ItemSlot {
    fn default() -> Self {
        Self {
            item_type: ItemType::default(),
            slot_number: -1,
        }
    }
}

impl fmt::Debug for ItemSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemSlot({}#{})", self.item_type, self.slot_number)
    }
}

/// Save data versions. Older versions are fixed up on load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum FormatVersion {
    /// Flat list of owned identities.
    Initial = 0,
    AddedInventory = 1,
    /// Structured count/level records.
    AddedItemData = 2,
}

impl FormatVersion {
    pub const LATEST: FormatVersion = FormatVersion::AddedItemData;

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(FormatVersion::Initial),
            1 => Some(FormatVersion::AddedInventory),
            2 => Some(FormatVersion::AddedItemData),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_string_form() {
        let id: ItemIdentity = "Weapon:Axe".parse().unwrap();
        assert_eq!(id.item_type, ItemType::from("Weapon"));
        assert_eq!(id.name, "Axe");
        assert_eq!(id.to_string(), "Weapon:Axe");

        // Only the first separator splits
        let id: ItemIdentity = "Token:Soul:Large".parse().unwrap();
        assert_eq!(id.name, "Soul:Large");
    }

    #[test]
    fn test_identity_rejects_malformed() {
        assert!("NoSeparator".parse::<ItemIdentity>().is_err());
        assert!(":Name".parse::<ItemIdentity>().is_err());
        assert!("Type:".parse::<ItemIdentity>().is_err());
    }

    #[test]
    fn test_identity_serializes_as_string() {
        let id = ItemIdentity::new("Potion", "Health");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"Potion:Health\"");
    }

    #[test]
    fn test_record_merge_clamps() {
        let record = ItemRecord::new(4, 1);
        let merged = record.merged_with(ItemRecord::new(3, 7), 5, 3);
        assert_eq!(merged, ItemRecord::new(5, 3));
    }

    #[test]
    fn test_record_merge_unbounded() {
        let record = ItemRecord::new(100, 1);
        let merged = record.merged_with(ItemRecord::new(50, 40), 0, -1);
        assert_eq!(merged, ItemRecord::new(150, 40));

        let saturated = ItemRecord::new(i32::MAX, 1).merged_with(ItemRecord::new(1, 1), 0, 0);
        assert_eq!(saturated.count, i32::MAX);
    }

    #[test]
    fn test_record_merge_from_absent() {
        let merged = ItemRecord::absent().merged_with(ItemRecord::new(1, 1), 5, 3);
        assert_eq!(merged, ItemRecord::new(1, 1));
        assert!(!ItemRecord::absent().is_valid());
    }

    #[test]
    fn test_slot_validity() {
        assert!(ItemSlot::new("Weapon", 0).is_valid());
        assert!(!ItemSlot::new("Weapon", -1).is_valid());
        assert!(!ItemSlot::new("", 0).is_valid());
        assert!(!ItemSlot::default().is_valid());
    }

    #[test]
    fn test_slot_ordering() {
        let mut slots = vec![
            ItemSlot::new("Weapon", 1),
            ItemSlot::new("Potion", 2),
            ItemSlot::new("Weapon", 0),
        ];
        slots.sort();
        assert_eq!(
            slots,
            vec![
                ItemSlot::new("Potion", 2),
                ItemSlot::new("Weapon", 0),
                ItemSlot::new("Weapon", 1),
            ]
        );
    }

    #[test]
    fn test_format_version_order() {
        assert!(FormatVersion::Initial < FormatVersion::AddedItemData);
        assert_eq!(FormatVersion::LATEST.as_u32(), 2);
        assert_eq!(FormatVersion::from_u32(1), Some(FormatVersion::AddedInventory));
        assert_eq!(FormatVersion::from_u32(9), None);
    }
}
