//! Durable snapshots of the inventory and how they reach the disk.
//!
//! - [`DurableSnapshot`]: the serializable projection of live state
//! - [`migrate`]: one-shot fixups for blobs written by older versions
//! - [`codec`]: framed MessagePack container with a checksum
//! - [`SaveBackend`]: where blobs live (file or memory)
//! - [`PersistenceGateway`]: owns the current snapshot and coalesces writes
//!   so at most one is in flight

pub mod codec;

mod backend;
mod gateway;
mod migration;
mod snapshot;
mod writer;

pub use backend::{FileBackend, MemoryBackend, SaveBackend};
pub use gateway::{GatewayConfig, PersistenceGateway, SaveStats, SharedGateway};
pub use migration::migrate;
pub use snapshot::DurableSnapshot;
pub use writer::{BlobWriter, WriteCompletion};
