//! File system scanning and inventory files for twinsift.
//!
//! This crate builds the flat file inventory the duplicate analysis works on:
//!
//! - **Parallel traversal** via jwalk/rayon
//! - **Content hashing** with BLAKE3, memory-mapped for large files
//! - **Progress updates** via broadcast channels
//! - **Inventory files** in CSV or JSON
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use twinsift_scan::{save_inventory, JwalkScanner, ScanConfig};
//!
//! let config = ScanConfig::new("/path/to/scan");
//! let outcome = JwalkScanner::new().scan(&config).unwrap();
//!
//! println!("Hashed {} files", outcome.stats.hashed);
//! save_inventory(Path::new("files_report.csv"), &outcome.inventory).unwrap();
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use twinsift_scan::JwalkScanner;
//!
//! let scanner = JwalkScanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         println!("Hashed {} files", progress.files_hashed);
//!     }
//! });
//! ```

mod hasher;
mod progress;
mod scanner;
mod store;

pub use hasher::{hash_bytes, hash_file, MMAP_THRESHOLD};
pub use progress::{ScanPhase, ScanProgress};
pub use scanner::{JwalkScanner, ScanOutcome, ScanStats};
pub use store::{
    load_inventory, read_csv, read_json, save_inventory, write_csv, write_json, InventoryFormat,
};

// Re-export core types for convenience
pub use twinsift_core::{
    FileRecord, Inventory, InventoryError, ScanConfig, ScanError, ScanWarning, WarningKind,
};
