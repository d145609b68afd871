//! Core types for twinsift.
//!
//! This crate provides the data structures shared by the scanner, the
//! duplicate analysis engine and the deletion executor: file records,
//! inventories and their validation filter, scan configuration and the
//! human-readable size formatter.

mod config;
mod error;
mod inventory;
mod record;
mod size;

pub use config::{ScanConfig, ScanConfigBuilder, DEFAULT_IGNORE_PATTERNS};
pub use error::{InventoryError, ScanError, ScanWarning, WarningKind};
pub use inventory::{ExclusionStats, Inventory, ValidatedInventory, ValidationRules};
pub use record::{ContentHash, FileRecord, HashedFile};
pub use size::format_size;
