//! Game setup loaded from JSON: slot layout, item definitions, default
//! inventory and save settings.

use crate::catalog::{ItemDefinition, StaticCatalog};
use crate::error::{InventoryError, Result};
use crate::persistence::GatewayConfig;
use crate::slots::SlotConfig;
use crate::types::{ItemIdentity, ItemRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

fn default_one() -> i32 {
    1
}

/// One entry of the starting inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultItem {
    pub item: ItemIdentity,

    #[serde(default = "default_one")]
    pub count: i32,

    #[serde(default = "default_one")]
    pub level: i32,
}

/// Everything the surrounding game supplies before a session starts.
///
/// ```json
/// {
///   "slots_per_type": { "Weapon": 3, "Skill": 3, "Potion": 1 },
///   "items": [ { "id": "Weapon:Axe", "max_count": 1, "max_level": 5 } ],
///   "default_inventory": [ { "item": "Weapon:Axe" } ],
///   "save": { "save_dir": "./saves", "slot_name": "SaveGame" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub slots_per_type: SlotConfig,
    pub items: Vec<ItemDefinition>,
    pub default_inventory: Vec<DefaultItem>,
    pub save: Option<GatewayConfig>,
}

impl InventoryConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: InventoryConfig =
            serde_json::from_str(json).map_err(|e| InventoryError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the default inventory against the item list.
    ///
    /// Default entries must have positive counts and levels. When item
    /// definitions are given, every default entry must name one of them.
    pub fn validate(&self) -> Result<()> {
        let known: HashSet<&ItemIdentity> = self.items.iter().map(|def| &def.id).collect();

        for entry in &self.default_inventory {
            if entry.count <= 0 || entry.level <= 0 {
                return Err(InventoryError::InvalidConfig(format!(
                    "default item {} needs a positive count and level",
                    entry.item
                )));
            }
            if !known.is_empty() && !known.contains(&entry.item) {
                return Err(InventoryError::UnknownItem(entry.item.to_string()));
            }
        }

        Ok(())
    }

    pub fn slot_config(&self) -> SlotConfig {
        self.slots_per_type.clone()
    }

    /// Catalog holding every configured item definition.
    pub fn catalog(&self) -> StaticCatalog {
        StaticCatalog::from_definitions(self.items.iter().cloned())
    }

    /// Save settings with the default inventory filled in. Later duplicate
    /// entries override earlier ones.
    pub fn gateway_config(&self) -> GatewayConfig {
        let mut config = self.save.clone().unwrap_or_default();
        config.default_inventory = self
            .default_inventory
            .iter()
            .map(|entry| (entry.item.clone(), ItemRecord::new(entry.count, entry.level)))
            .collect();
        config
    }
}
