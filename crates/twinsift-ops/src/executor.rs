//! Carrying out a deletion plan.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use twinsift_analyze::DeletionEntry;
use twinsift_core::format_size;

use crate::operation::{DeletionFailure, DeletionMode, OperationError};

/// Progress of a running deletion.
#[derive(Debug, Clone)]
pub struct DeletionProgress {
    /// Entries in the plan.
    pub total: usize,
    /// Entries handled so far.
    pub processed: usize,
    /// Bytes reclaimed so far.
    pub bytes_freed: u64,
    /// Entry about to be handled.
    pub current: Option<PathBuf>,
}

/// Result of running a deletion plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    /// Mode the plan ran in.
    #[serde(skip)]
    pub mode: DeletionMode,
    /// Files removed, trashed, or (in a dry run) that would be.
    pub deleted: Vec<PathBuf>,
    /// Files already gone when their turn came.
    pub skipped: Vec<PathBuf>,
    /// Files left in place because of an error or a safety check.
    pub failed: Vec<OperationError>,
    /// Bytes reclaimed, or reclaimable in a dry run.
    pub bytes_freed: u64,
}

impl DeletionOutcome {
    /// Check whether every entry was handled without error.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line summary of the run.
    pub fn summary(&self) -> String {
        let verb = match self.mode {
            DeletionMode::DryRun => "Would delete",
            DeletionMode::Remove => "Deleted",
            DeletionMode::Trash => "Trashed",
        };
        let mut msg = format!(
            "{verb} {} files, freeing {}",
            self.deleted.len(),
            format_size(self.bytes_freed)
        );
        if !self.skipped.is_empty() {
            msg.push_str(&format!(", {} already gone", self.skipped.len()));
        }
        if !self.failed.is_empty() {
            msg.push_str(&format!(", {} failed", self.failed.len()));
        }
        msg
    }
}

/// Applies deletion entries to the filesystem.
///
/// Before each deletion the executor checks that the kept copy still exists
/// and that the candidate still has its recorded size, so a stale plan can
/// never remove the last copy of a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionExecutor {
    mode: DeletionMode,
}

impl DeletionExecutor {
    /// Create a dry-run executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor for the given mode.
    pub fn with_mode(mode: DeletionMode) -> Self {
        Self { mode }
    }

    /// Mode this executor runs in.
    pub fn mode(&self) -> DeletionMode {
        self.mode
    }

    /// Run every entry in order.
    pub fn execute(&self, entries: &[DeletionEntry]) -> DeletionOutcome {
        self.execute_with_progress(entries, |_| {})
    }

    /// Run every entry in order, reporting progress before each one.
    pub fn execute_with_progress<F>(
        &self,
        entries: &[DeletionEntry],
        mut on_progress: F,
    ) -> DeletionOutcome
    where
        F: FnMut(&DeletionProgress),
    {
        let mut outcome = DeletionOutcome {
            mode: self.mode,
            ..DeletionOutcome::default()
        };

        for (processed, entry) in entries.iter().enumerate() {
            on_progress(&DeletionProgress {
                total: entries.len(),
                processed,
                bytes_freed: outcome.bytes_freed,
                current: Some(entry.path.clone()),
            });

            match self.apply(entry) {
                Ok(true) => {
                    debug!(path = %entry.path.display(), mode = %self.mode, "deleted duplicate");
                    outcome.bytes_freed += entry.size;
                    outcome.deleted.push(entry.path.clone());
                }
                Ok(false) => {
                    warn!(path = %entry.path.display(), "file no longer exists, skipping");
                    outcome.skipped.push(entry.path.clone());
                }
                Err(reason) => {
                    warn!(path = %entry.path.display(), %reason, "deletion refused");
                    outcome
                        .failed
                        .push(OperationError::new(entry.path.clone(), reason));
                }
            }
        }

        on_progress(&DeletionProgress {
            total: entries.len(),
            processed: entries.len(),
            bytes_freed: outcome.bytes_freed,
            current: None,
        });

        info!(
            mode = %self.mode,
            deleted = outcome.deleted.len(),
            skipped = outcome.skipped.len(),
            failed = outcome.failed.len(),
            bytes_freed = outcome.bytes_freed,
            "deletion plan finished"
        );
        outcome
    }

    /// Handle one entry. `Ok(false)` means the candidate was already gone.
    fn apply(&self, entry: &DeletionEntry) -> Result<bool, DeletionFailure> {
        if entry.path == entry.kept {
            return Err(DeletionFailure::TargetIsKept);
        }

        let metadata = match fs::symlink_metadata(&entry.path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(DeletionFailure::Io(e.to_string())),
        };

        if !entry.kept.exists() {
            return Err(DeletionFailure::KeptCopyMissing(entry.kept.clone()));
        }

        if metadata.is_file() && metadata.len() != entry.size {
            return Err(DeletionFailure::SizeChanged {
                expected: entry.size,
                actual: metadata.len(),
            });
        }

        match self.mode {
            DeletionMode::DryRun => Ok(true),
            DeletionMode::Remove => remove(&entry.path).map(|()| true),
            DeletionMode::Trash => trash::delete(&entry.path)
                .map(|()| true)
                .map_err(|e| DeletionFailure::Io(format!("trash error: {e}"))),
        }
    }
}

fn remove(path: &Path) -> Result<(), DeletionFailure> {
    fs::remove_file(path).map_err(|e| DeletionFailure::Io(e.to_string()))
}
