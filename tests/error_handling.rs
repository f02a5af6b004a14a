//! Error handling and edge case tests.

use satchel::persistence::codec;
use satchel::{
    DurableSnapshot, FileBackend, GatewayConfig, InventoryError, InventoryStore, ItemDefinition,
    ItemIdentity, ItemRecord, ItemRef, ItemSlot, MemoryBackend, PersistenceGateway, SaveBackend,
    SlotConfig, StaticCatalog,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

fn catalog() -> (StaticCatalog, ItemRef, ItemRef) {
    let mut catalog = StaticCatalog::new();
    let axe = catalog.insert(ItemDefinition::new(ItemIdentity::new("Weapon", "Axe"), 1, 5));
    let potion = catalog.insert(ItemDefinition::new(ItemIdentity::new("Potion", "Health"), 5, 3));
    (catalog, axe, potion)
}

fn slots() -> SlotConfig {
    SlotConfig::new().with_slots("Weapon", 2).with_slots("Potion", 1)
}

fn defaults_config() -> GatewayConfig {
    let mut config = GatewayConfig {
        user_id: "p1".to_string(),
        ..Default::default()
    };
    config
        .default_inventory
        .insert(ItemIdentity::new("Weapon", "Axe"), ItemRecord::default());
    config
}

// --- Load Errors ---

#[test]
fn test_corrupt_blob_loads_fresh() {
    let mut blob = codec::encode_snapshot(&DurableSnapshot::new("p1")).unwrap();
    let last = blob.len() - 1;
    blob[last] ^= 0xFF;

    let backend = Arc::new(MemoryBackend::with_blob(blob));
    let mut gateway = PersistenceGateway::open(defaults_config(), backend).unwrap();

    let (snapshot, from_disk) = gateway.load();
    assert!(!from_disk);
    assert_eq!(snapshot.user_id, "p1");
    assert!(snapshot.inventory.contains_key(&ItemIdentity::new("Weapon", "Axe")));
    assert_eq!(gateway.stats().loads_from_disk, 0);
}

#[test]
fn test_garbage_blob_loads_fresh() {
    let backend = Arc::new(MemoryBackend::with_blob(b"definitely not a save".to_vec()));
    let mut gateway = PersistenceGateway::open(GatewayConfig::default(), backend).unwrap();

    let (snapshot, from_disk) = gateway.load();
    assert!(!from_disk);
    assert!(snapshot.inventory.is_empty());
}

#[test]
fn test_read_failure_loads_fresh() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_fail_reads(true);
    let mut gateway = PersistenceGateway::open(defaults_config(), backend).unwrap();

    let (snapshot, from_disk) = gateway.load();
    assert!(!from_disk);
    assert_eq!(snapshot.inventory.len(), 1);
}

#[test]
fn test_truncated_file_loads_fresh() {
    let dir = TempDir::new().unwrap();
    let config = GatewayConfig {
        save_dir: dir.path().to_path_buf(),
        ..defaults_config()
    };

    {
        let backend = FileBackend::open(dir.path(), &config.slot_name, config.user_index).unwrap();
        let blob = codec::encode_snapshot(&DurableSnapshot::new("p1")).unwrap();
        backend.save_blob(&blob[..blob.len() / 2]).unwrap();
    }

    let mut gateway = PersistenceGateway::open_file(config).unwrap();
    let (_, from_disk) = gateway.load();
    assert!(!from_disk);
}

// --- Locking ---

#[test]
fn test_second_gateway_on_same_slot_is_locked() {
    let dir = TempDir::new().unwrap();
    let config = GatewayConfig {
        save_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let _first = PersistenceGateway::open_file(config.clone()).unwrap();
    let second = PersistenceGateway::open_file(config.clone());
    assert!(matches!(second, Err(InventoryError::Locked)));

    // A different user index is a different slot
    let other = GatewayConfig {
        user_index: 1,
        ..config
    };
    assert!(PersistenceGateway::open_file(other).is_ok());
}

#[test]
fn test_lock_released_on_drop() {
    let dir = TempDir::new().unwrap();
    let config = GatewayConfig {
        save_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let gateway = PersistenceGateway::open_file(config.clone()).unwrap();
    drop(gateway);
    assert!(PersistenceGateway::open_file(config).is_ok());
}

// --- Write Errors ---

#[test]
fn test_failed_writes_do_not_stall_saving() {
    let (catalog, axe, potion) = catalog();
    let backend = Arc::new(MemoryBackend::new());
    backend.set_fail_writes(true);

    let gateway = PersistenceGateway::open(GatewayConfig::default(), backend.clone())
        .unwrap()
        .into_shared();
    let mut store = InventoryStore::new(Arc::new(catalog), slots()).with_gateway(gateway.clone());
    store.hydrate();

    // Mutations still succeed in memory while the disk is failing
    assert!(store.add_item(&axe, 1, 1, true));
    assert!(store.add_item(&potion, 2, 1, true));
    assert!(gateway.lock().flush(WAIT));
    assert!(gateway.lock().stats().writes_failed >= 1);
    assert!(backend.blob().is_none());

    backend.set_fail_writes(false);
    assert!(store.remove_item(&potion, 1));
    assert!(gateway.lock().flush(WAIT));

    let stored = codec::decode_snapshot(&backend.blob().unwrap()).unwrap();
    assert_eq!(stored.inventory.get(&ItemIdentity::new("Potion", "Health")), Some(&ItemRecord::new(1, 1)));
    assert_eq!(
        stored.slots.get(&ItemSlot::new("Weapon", 0)),
        Some(&Some(ItemIdentity::new("Weapon", "Axe")))
    );
}

// --- Hydration Edge Cases ---

#[test]
fn test_save_with_unknown_items_and_stale_slots() {
    let mut snapshot = DurableSnapshot::new("p1");
    snapshot.inventory.insert(ItemIdentity::new("Weapon", "Axe"), ItemRecord::new(1, 4));
    snapshot.inventory.insert(ItemIdentity::new("Weapon", "Retired"), ItemRecord::new(1, 1));
    snapshot.slots.insert(ItemSlot::new("Weapon", 0), Some(ItemIdentity::new("Weapon", "Retired")));
    // Slot layout shrank since this was saved
    snapshot.slots.insert(ItemSlot::new("Weapon", 5), Some(ItemIdentity::new("Weapon", "Axe")));

    let backend = Arc::new(MemoryBackend::with_blob(codec::encode_snapshot(&snapshot).unwrap()));
    let gateway = PersistenceGateway::open(GatewayConfig::default(), backend)
        .unwrap()
        .into_shared();
    gateway.lock().load();

    let (catalog, axe, _) = catalog();
    let mut store = InventoryStore::new(Arc::new(catalog), slots()).with_gateway(gateway.clone());
    assert!(store.hydrate());

    assert_eq!(store.items(None), vec![axe.clone()]);
    assert_eq!(store.item_record(&axe), Some(ItemRecord::new(1, 4)));
    // No usable slot survived, so the axe is auto-slotted
    assert_eq!(store.slotted_item(&ItemSlot::new("Weapon", 0)), Some(axe));
    assert_eq!(store.slotted_items(None, true).len(), 3);
    assert!(gateway.lock().flush(WAIT));
}

#[test]
fn test_queries_on_unknown_slots_and_items() {
    let (catalog, axe, potion) = catalog();
    let mut store = InventoryStore::new(Arc::new(catalog), slots());
    assert!(store.slotted_items(None, true).is_empty());

    store.hydrate();
    store.add_item(&axe, 1, 1, true);

    assert_eq!(store.slotted_item(&ItemSlot::new("Skill", 0)), None);
    assert_eq!(store.slotted_item(&ItemSlot::default()), None);
    assert_eq!(store.item_count(&potion), 0);
    assert_eq!(store.item_record(&potion), None);
    assert!(!store.remove_item(&potion, 1));
    assert!(!store.set_slotted_item(&ItemSlot::new("Potion", 0), Some(&potion)));
}

#[test]
fn test_newer_format_version_is_accepted() {
    let mut snapshot = DurableSnapshot::new("p1");
    snapshot.format_version = 99;
    snapshot.inventory.insert(ItemIdentity::new("Weapon", "Axe"), ItemRecord::new(1, 2));

    let backend = Arc::new(MemoryBackend::with_blob(codec::encode_snapshot(&snapshot).unwrap()));
    let mut gateway = PersistenceGateway::open(GatewayConfig::default(), backend).unwrap();
    let (loaded, from_disk) = gateway.load();

    assert!(from_disk);
    assert!(loaded.is_latest());
    assert_eq!(loaded.inventory.len(), 1);
}
