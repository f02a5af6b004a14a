//! Background thread that performs blob writes.
//!
//! The owner thread hands over an already-encoded blob; the worker never
//! sees live inventory state. Completions come back over a channel and are
//! applied on the owner thread when it pumps them.

use crate::error::{InventoryError, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error};

use super::backend::SaveBackend;

struct WriteJob {
    ticket: u64,
    blob: Vec<u8>,
}

/// Outcome of one dispatched write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteCompletion {
    pub ticket: u64,
    pub success: bool,
}

/// Handle to the writer thread.
pub struct BlobWriter {
    jobs: Option<Sender<WriteJob>>,
    completions: Receiver<WriteCompletion>,
    handle: Option<JoinHandle<()>>,
}

impl BlobWriter {
    /// Start a writer thread for `backend`.
    pub fn spawn(backend: Arc<dyn SaveBackend>) -> Result<Self> {
        let (job_tx, job_rx) = unbounded::<WriteJob>();
        let (done_tx, done_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("satchel-save-writer".into())
            .spawn(move || {
                for job in job_rx.iter() {
                    let success = match backend.save_blob(&job.blob) {
                        Ok(()) => {
                            debug!(ticket = job.ticket, bytes = job.blob.len(), "save written");
                            true
                        }
                        Err(e) => {
                            error!(ticket = job.ticket, error = %e, "save write failed");
                            false
                        }
                    };

                    let completion = WriteCompletion {
                        ticket: job.ticket,
                        success,
                    };
                    if done_tx.send(completion).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            jobs: Some(job_tx),
            completions: done_rx,
            handle: Some(handle),
        })
    }

    /// Queue a blob for writing. Never blocks.
    pub fn dispatch(&self, ticket: u64, blob: Vec<u8>) -> Result<()> {
        let jobs = self.jobs.as_ref().ok_or(InventoryError::WorkerStopped)?;
        jobs.send(WriteJob { ticket, blob })
            .map_err(|_| InventoryError::WorkerStopped)
    }

    /// A completion that has already arrived, if any.
    pub fn try_completion(&self) -> Option<WriteCompletion> {
        self.completions.try_recv().ok()
    }

    /// Wait up to `timeout` for the next completion.
    pub fn wait_completion(&self, timeout: Duration) -> Option<WriteCompletion> {
        match self.completions.recv_timeout(timeout) {
            Ok(completion) => Some(completion),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Stop accepting jobs and let the thread finish on its own.
    ///
    /// Dropping a detached writer never blocks, even with a write stuck in
    /// the backend.
    pub fn detach(&mut self) {
        self.jobs.take();
        self.handle.take();
    }
}

impl Drop for BlobWriter {
    fn drop(&mut self) {
        // Closing the job channel lets the thread exit once its queue drains.
        // Joining releases the thread's hold on the backend (and its lock file).
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("save writer thread panicked");
            }
        }
    }
}
