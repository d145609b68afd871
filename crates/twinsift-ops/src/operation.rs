//! Deletion operation types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// How planned deletions are carried out.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DeletionMode {
    /// Report what would happen without touching anything.
    #[default]
    DryRun,
    /// Permanently remove files.
    Remove,
    /// Move files to the platform trash.
    Trash,
}

impl DeletionMode {
    /// Check whether this mode modifies the filesystem.
    pub fn is_destructive(self) -> bool {
        !matches!(self, Self::DryRun)
    }
}

/// Why a planned deletion was refused or failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DeletionFailure {
    /// The copy meant to survive is gone, so this one is the last.
    #[error("kept copy {0} no longer exists")]
    KeptCopyMissing(PathBuf),

    /// The entry names the kept copy itself.
    #[error("refusing to delete the kept copy")]
    TargetIsKept,

    /// The file changed size since the inventory was taken.
    #[error("size changed from {expected} to {actual} bytes")]
    SizeChanged { expected: u64, actual: u64 },

    /// The filesystem or trash rejected the operation.
    #[error("{0}")]
    Io(String),
}

/// An error that occurred while deleting one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// The path that caused the error.
    pub path: PathBuf,
    /// What went wrong.
    pub reason: DeletionFailure,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(path: PathBuf, reason: DeletionFailure) -> Self {
        Self { path, reason }
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

impl std::error::Error for OperationError {}
