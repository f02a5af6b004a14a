//! Error types for the inventory store and its persistence layer.

use thiserror::Error;

/// Main error type for inventory and save operations.
///
/// Inventory mutations report caller misuse as `false` rather than through
/// this type; it covers construction, configuration and I/O plumbing.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid save format: {0}")]
    InvalidFormat(String),

    #[error("Checksum mismatch: expected {expected}, got {got}")]
    ChecksumMismatch { expected: u32, got: u32 },

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("Save slot is locked by another process")]
    Locked,

    #[error("Invalid item identity: {0}")]
    InvalidIdentity(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Save writer has stopped")]
    WorkerStopped,
}

impl From<serde_json::Error> for InventoryError {
    fn from(e: serde_json::Error) -> Self {
        InventoryError::Deserialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for InventoryError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        InventoryError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for InventoryError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        InventoryError::Deserialization(e.to_string())
    }
}

/// Result type for inventory operations.
pub type Result<T> = std::result::Result<T, InventoryError>;
