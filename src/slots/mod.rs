//! Slot configuration and automatic slot assignment.

mod allocator;
mod config;

pub use allocator::{find_slot_for, SlotAssignment};
pub use config::SlotConfig;
