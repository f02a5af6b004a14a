//! Save blob container.
//!
//! ```text
//! magic "SAV\0" | container version u8 | payload length u32 LE | payload | CRC32 LE
//! ```
//!
//! The payload is MessagePack with named fields, so fields can be added or
//! retired (see the legacy item list) without breaking older readers.

use crate::error::{InventoryError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::snapshot::DurableSnapshot;

/// Magic bytes for save blobs.
const SAVE_MAGIC: &[u8; 4] = b"SAV\0";

/// Current container version.
const CONTAINER_VERSION: u8 = 1;

/// Magic + version + length.
const HEADER_LEN: usize = 9;

const CHECKSUM_LEN: usize = 4;

/// Upper bound on payload size accepted when decoding.
const MAX_PAYLOAD_LEN: usize = 64 * 1024 * 1024;

/// Serialize `value` into a framed blob.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let payload = rmp_serde::to_vec_named(value)?;
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(InventoryError::Serialization(format!(
            "payload of {} bytes exceeds limit",
            payload.len()
        )));
    }

    let mut blob = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
    blob.extend_from_slice(SAVE_MAGIC);
    blob.push(CONTAINER_VERSION);
    blob.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    blob.extend_from_slice(&payload);
    blob.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());

    Ok(blob)
}

/// Verify and deserialize a framed blob.
pub fn decode<T: DeserializeOwned>(blob: &[u8]) -> Result<T> {
    if blob.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(InventoryError::InvalidFormat("save blob truncated".into()));
    }

    if &blob[0..4] != SAVE_MAGIC {
        return Err(InventoryError::InvalidFormat("Invalid save magic".into()));
    }

    if blob[4] != CONTAINER_VERSION {
        return Err(InventoryError::InvalidFormat(format!(
            "Unsupported container version: {}",
            blob[4]
        )));
    }

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&blob[5..HEADER_LEN]);
    let len = u32::from_le_bytes(len_bytes) as usize;

    if len > MAX_PAYLOAD_LEN {
        return Err(InventoryError::Corruption("save payload too large".into()));
    }
    if blob.len() != HEADER_LEN + len + CHECKSUM_LEN {
        return Err(InventoryError::Corruption(format!(
            "length mismatch: header says {} bytes, blob holds {}",
            len,
            blob.len().saturating_sub(HEADER_LEN + CHECKSUM_LEN)
        )));
    }

    let payload = &blob[HEADER_LEN..HEADER_LEN + len];

    let mut checksum_bytes = [0u8; 4];
    checksum_bytes.copy_from_slice(&blob[HEADER_LEN + len..]);
    let stored = u32::from_le_bytes(checksum_bytes);
    let computed = crc32fast::hash(payload);
    if stored != computed {
        return Err(InventoryError::ChecksumMismatch {
            expected: stored,
            got: computed,
        });
    }

    Ok(rmp_serde::from_slice(payload)?)
}

pub fn encode_snapshot(snapshot: &DurableSnapshot) -> Result<Vec<u8>> {
    encode(snapshot)
}

/// Decode a snapshot as stored; no migration is applied.
pub fn decode_snapshot(blob: &[u8]) -> Result<DurableSnapshot> {
    decode(blob)
}
