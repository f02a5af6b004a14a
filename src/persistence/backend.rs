//! Blob storage for save data.

use crate::error::{InventoryError, Result};
use fs2::FileExt;
use parking_lot::{Condvar, Mutex};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Where save blobs are read from and written to.
///
/// `save_blob` runs on the writer thread and may block.
pub trait SaveBackend: Send + Sync {
    /// Read the stored blob; `None` if nothing has been saved yet.
    fn load_blob(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the stored blob.
    fn save_blob(&self, blob: &[u8]) -> Result<()>;
}

/// One save slot on the local filesystem.
///
/// Layout under the save directory:
/// - `{slot}_{user}.sav`: the blob, replaced atomically
/// - `{slot}_{user}.lock`: held exclusively while the backend is open
pub struct FileBackend {
    blob_path: PathBuf,
    temp_path: PathBuf,

    /// Lock file for exclusive access.
    _lock_file: File,
}

impl FileBackend {
    /// Open (creating the directory if needed) and lock a save slot.
    pub fn open(dir: impl AsRef<Path>, slot_name: &str, user_index: u32) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let stem = format!("{}_{}", slot_name, user_index);
        let lock_file = Self::acquire_lock(&dir.join(format!("{}.lock", stem)))?;

        Ok(Self {
            blob_path: dir.join(format!("{}.sav", stem)),
            temp_path: dir.join(format!("{}.sav.tmp", stem)),
            _lock_file: lock_file,
        })
    }

    pub fn blob_path(&self) -> &Path {
        &self.blob_path
    }

    /// Persist the rename itself.
    #[cfg(unix)]
    fn sync_dir(&self) -> Result<()> {
        let dir = match self.blob_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        File::open(dir)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) -> Result<()> {
        Ok(())
    }

    fn acquire_lock(path: &Path) -> Result<File> {
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| InventoryError::Locked)?;

        Ok(lock_file)
    }
}

impl SaveBackend for FileBackend {
    fn load_blob(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.blob_path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_blob(&self, blob: &[u8]) -> Result<()> {
        // Write aside and rename so readers never see a torn blob
        let mut file = File::create(&self.temp_path)?;
        file.write_all(blob)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.temp_path, &self.blob_path)?;
        self.sync_dir()?;
        Ok(())
    }
}

/// In-memory backend with hooks for exercising failure and timing.
#[derive(Default)]
pub struct MemoryBackend {
    blob: Mutex<Option<Vec<u8>>>,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already holds a blob.
    pub fn with_blob(blob: Vec<u8>) -> Self {
        let backend = Self::new();
        *backend.blob.lock() = Some(blob);
        backend
    }

    /// The currently stored blob.
    pub fn blob(&self) -> Option<Vec<u8>> {
        self.blob.lock().clone()
    }

    /// Number of `save_blob` calls that ran to completion, successful or not.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Block writes until [`MemoryBackend::resume`].
    pub fn pause(&self) {
        *self.paused.lock() = true;
    }

    pub fn resume(&self) {
        *self.paused.lock() = false;
        self.resumed.notify_all();
    }
}

impl SaveBackend for MemoryBackend {
    fn load_blob(&self) -> Result<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(ErrorKind::Other, "injected read failure").into());
        }
        Ok(self.blob.lock().clone())
    }

    fn save_blob(&self, blob: &[u8]) -> Result<()> {
        {
            let mut paused = self.paused.lock();
            while *paused {
                self.resumed.wait(&mut paused);
            }
        }

        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(std::io::Error::new(ErrorKind::Other, "injected write failure").into())
        } else {
            *self.blob.lock() = Some(blob.to_vec());
            Ok(())
        };

        self.writes.fetch_add(1, Ordering::SeqCst);
        result
    }
}
