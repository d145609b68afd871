//! Duplicate analysis for twinsift.
//!
//! Given a flat inventory of (path, size, hash) records this crate:
//!
//! - **Groups duplicates** by content hash and size, decomposing each copy
//!   against the group's common ancestor folder
//! - **Classifies groups** into automatically resolvable shapes with a
//!   deterministic keep/delete decision per file
//! - **Plans deletions** by flattening the decisions into one ordered list
//! - **Counts folder co-occurrence** to point at directories that are whole
//!   copies of each other
//!
//! Nothing here touches the filesystem; deletion is left to `twinsift-ops`.
//!
//! ```rust
//! use twinsift_analyze::{Analyzer, ResolutionCategory};
//! use twinsift_core::{ContentHash, FileRecord, Inventory};
//!
//! let inventory = Inventory::new(vec![
//!     FileRecord::new("/photos/beach.jpg", 2048, ContentHash::new("abc")),
//!     FileRecord::new("/photos/beach (1).jpg", 2048, ContentHash::new("abc")),
//! ]);
//!
//! let report = Analyzer::new().analyze(&inventory).unwrap();
//! assert_eq!(report.resolutions[0].category, ResolutionCategory::SameFolderDiffName);
//! assert_eq!(report.deletion_plan.entries()[0].path.to_str(), Some("/photos/beach (1).jpg"));
//! ```

mod analyzer;
mod classify;
mod config;
mod cooccurrence;
mod deletion;
mod error;
mod group;
mod prefix;

pub use analyzer::{AnalysisReport, AnalysisSummary, Analyzer};
pub use classify::{classify, Decision, Resolution, ResolutionCategory};
pub use config::{AnalyzeConfig, AnalyzeConfigBuilder, GroupKey};
pub use cooccurrence::{folder_cooccurrence, FolderPair};
pub use deletion::{deletion_list, DeletionEntry, DeletionPlan};
pub use error::AnalyzeError;
pub use group::{group_duplicates, DuplicateGroup, GroupMember};
pub use prefix::{common_ancestor, rejoin};

// Re-export core types
pub use twinsift_core::{format_size, ContentHash, FileRecord, HashedFile, Inventory};
