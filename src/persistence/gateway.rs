//! Owner of the current save snapshot and the write coalescing protocol.

use crate::error::Result;
use crate::types::{ItemIdentity, ItemRecord};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::backend::{FileBackend, SaveBackend};
use super::codec;
use super::migration::migrate;
use super::snapshot::DurableSnapshot;
use super::writer::BlobWriter;

/// How long dropping a gateway waits for outstanding writes.
const DROP_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Gateway configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Directory holding save files.
    pub save_dir: PathBuf,

    /// Save slot name.
    pub slot_name: String,

    /// Platform user index, part of the save file name.
    pub user_index: u32,

    /// When false, nothing is read from or written to disk.
    pub saving_enabled: bool,

    /// User id stamped on fresh snapshots.
    pub user_id: String,

    /// Items every save starts with.
    #[serde(skip)]
    pub default_inventory: IndexMap<ItemIdentity, ItemRecord>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("./saves"),
            slot_name: "SaveGame".to_string(),
            user_index: 0,
            saving_enabled: true,
            user_id: String::new(),
            default_inventory: IndexMap::new(),
        }
    }
}

/// Counters for save activity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveStats {
    /// Writes handed to the writer thread.
    pub writes_dispatched: u64,
    pub writes_succeeded: u64,
    pub writes_failed: u64,
    /// Requests folded into a pending write.
    pub requests_coalesced: u64,
    /// Snapshots that were read from disk.
    pub loads_from_disk: u64,
}

/// Gateway shared between the inventory store and whoever drives loading.
pub type SharedGateway = Arc<Mutex<PersistenceGateway>>;

/// Owns the durable snapshot and writes it asynchronously.
///
/// At most one write is in flight. Requests arriving meanwhile collapse into
/// a single pending flag; when the in-flight write completes, one more write
/// of the then-current snapshot is issued. A burst of requests during one
/// write therefore costs exactly two writes.
///
/// All bookkeeping happens on the owner thread. Completions are applied by
/// [`PersistenceGateway::pump`] (once per tick) or
/// [`PersistenceGateway::flush`].
pub struct PersistenceGateway {
    config: GatewayConfig,
    backend: Arc<dyn SaveBackend>,
    writer: BlobWriter,
    snapshot: DurableSnapshot,
    write_in_flight: bool,
    write_pending: bool,
    next_ticket: u64,
    stats: SaveStats,
}

impl PersistenceGateway {
    /// Create a gateway over `backend`. The initial snapshot is fresh;
    /// call [`PersistenceGateway::load`] to read the stored one.
    pub fn open(config: GatewayConfig, backend: Arc<dyn SaveBackend>) -> Result<Self> {
        let writer = BlobWriter::spawn(Arc::clone(&backend))?;
        let snapshot = Self::fresh_snapshot(&config);

        Ok(Self {
            config,
            backend,
            writer,
            snapshot,
            write_in_flight: false,
            write_pending: false,
            next_ticket: 1,
            stats: SaveStats::default(),
        })
    }

    /// Create a gateway over the configured save file.
    pub fn open_file(config: GatewayConfig) -> Result<Self> {
        let backend = FileBackend::open(&config.save_dir, &config.slot_name, config.user_index)?;
        Self::open(config, Arc::new(backend))
    }

    pub fn into_shared(self) -> SharedGateway {
        Arc::new(Mutex::new(self))
    }

    // --- Loading ---

    /// Replace the current snapshot with the stored one.
    ///
    /// Never fails: a missing or unreadable blob, or disabled saving, yields a
    /// fresh snapshot. Older formats are migrated before anything sees them,
    /// and default inventory missing from the save is added. Returns the
    /// snapshot and whether it came from disk.
    pub fn load(&mut self) -> (&DurableSnapshot, bool) {
        let loaded = if self.config.saving_enabled {
            self.read_stored()
        } else {
            None
        };

        let from_disk = loaded.is_some();
        self.snapshot = match loaded {
            Some(mut snapshot) => {
                snapshot.add_default_inventory(&self.config.default_inventory, false);
                self.stats.loads_from_disk += 1;
                info!(items = snapshot.inventory.len(), "save loaded");
                snapshot
            }
            None => {
                info!("starting from a fresh save");
                Self::fresh_snapshot(&self.config)
            }
        };

        (&self.snapshot, from_disk)
    }

    /// Discard the current snapshot in favour of a fresh default one.
    ///
    /// Nothing reaches disk until the next save request.
    pub fn reset(&mut self) {
        info!("save reset to defaults");
        self.snapshot = Self::fresh_snapshot(&self.config);
    }

    fn read_stored(&self) -> Option<DurableSnapshot> {
        let blob = match self.backend.load_blob() {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                error!(error = %e, "failed to read save, starting fresh");
                return None;
            }
        };

        match codec::decode_snapshot(&blob) {
            Ok(snapshot) => Some(migrate(snapshot)),
            Err(e) => {
                error!(error = %e, "unreadable save, starting fresh");
                None
            }
        }
    }

    fn fresh_snapshot(config: &GatewayConfig) -> DurableSnapshot {
        let mut snapshot = DurableSnapshot::new(config.user_id.clone());
        snapshot.add_default_inventory(&config.default_inventory, true);
        snapshot
    }

    // --- Saving ---

    /// Re-derive the snapshot with `derive` and schedule a write.
    ///
    /// Returns immediately. If a write is in flight the request is coalesced
    /// into the pending flag. Returns false only when saving is disabled (in
    /// which case nothing, not even the snapshot, changes) or the write could
    /// not be dispatched.
    pub fn request_save<F>(&mut self, derive: F) -> bool
    where
        F: FnOnce(&mut DurableSnapshot),
    {
        if !self.config.saving_enabled {
            return false;
        }

        derive(&mut self.snapshot);
        self.write()
    }

    /// Schedule a write of the current snapshot as it stands.
    pub fn write(&mut self) -> bool {
        if !self.config.saving_enabled {
            return false;
        }

        if self.write_in_flight {
            self.write_pending = true;
            self.stats.requests_coalesced += 1;
            debug!("save requested during write, coalescing");
            return true;
        }

        self.dispatch()
    }

    fn dispatch(&mut self) -> bool {
        // Encoding captures the snapshot by value before it leaves this thread
        let blob = match codec::encode_snapshot(&self.snapshot) {
            Ok(blob) => blob,
            Err(e) => {
                error!(error = %e, "failed to encode save");
                self.stats.writes_failed += 1;
                return false;
            }
        };

        let ticket = self.next_ticket;
        if let Err(e) = self.writer.dispatch(ticket, blob) {
            error!(error = %e, "failed to dispatch save");
            self.stats.writes_failed += 1;
            return false;
        }

        self.next_ticket += 1;
        self.write_in_flight = true;
        self.stats.writes_dispatched += 1;
        debug!(ticket, "save dispatched");
        true
    }

    /// Apply the outcome of the in-flight write.
    ///
    /// Success and failure are handled alike: failed writes are not retried,
    /// and a pending request is written next either way.
    fn on_write_complete(&mut self, success: bool) {
        if !self.write_in_flight {
            warn!("write completion with no write in flight");
        }
        self.write_in_flight = false;

        if success {
            self.stats.writes_succeeded += 1;
        } else {
            self.stats.writes_failed += 1;
        }

        if self.write_pending {
            self.write_pending = false;
            self.write();
        }
    }

    /// Apply completions that have already arrived. Non-blocking; returns
    /// how many were processed.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Some(completion) = self.writer.try_completion() {
            self.on_write_complete(completion.success);
            processed += 1;
        }
        processed
    }

    /// Block until no write is in flight or pending, or `timeout` passes.
    /// Returns true if everything was written (or failed) in time.
    pub fn flush(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while self.write_in_flight {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.writer.wait_completion(remaining) {
                Some(completion) => self.on_write_complete(completion.success),
                None => return false,
            }
        }

        true
    }

    // --- Accessors ---

    /// The current snapshot.
    pub fn snapshot(&self) -> &DurableSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn saving_enabled(&self) -> bool {
        self.config.saving_enabled
    }

    /// Enable or disable saving. While disabled, loads start fresh and save
    /// requests do nothing.
    pub fn set_saving_enabled(&mut self, enabled: bool) {
        self.config.saving_enabled = enabled;
    }

    /// Slot name and user index identifying the save on disk.
    pub fn slot_info(&self) -> (&str, u32) {
        (&self.config.slot_name, self.config.user_index)
    }

    pub fn is_write_in_flight(&self) -> bool {
        self.write_in_flight
    }

    pub fn is_write_pending(&self) -> bool {
        self.write_pending
    }

    pub fn stats(&self) -> &SaveStats {
        &self.stats
    }
}

impl Drop for PersistenceGateway {
    fn drop(&mut self) {
        // Best-effort: let the final state reach disk
        if self.write_in_flight && !self.flush(DROP_FLUSH_TIMEOUT) {
            warn!("save still in flight at shutdown, abandoning writer");
            self.writer.detach();
        }
    }
}
