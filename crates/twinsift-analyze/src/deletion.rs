//! Flattening resolutions into an ordered deletion plan.

use std::path::PathBuf;

use serde::Serialize;

use crate::classify::{Resolution, ResolutionCategory};

/// A file scheduled for deletion, with the copy that stays behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionEntry {
    /// File to delete.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// The duplicate kept in the same group.
    pub kept: PathBuf,
    /// Shape of the group the decision came from.
    pub category: ResolutionCategory,
}

/// Ordered list of files recommended for deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeletionPlan {
    entries: Vec<DeletionEntry>,
}

impl DeletionPlan {
    /// Collect every non-kept decision, group by group, preserving each
    /// group's decision order.
    pub fn from_resolutions<'a, I>(resolutions: I) -> Self
    where
        I: IntoIterator<Item = &'a Resolution>,
    {
        let entries = resolutions
            .into_iter()
            .filter_map(|resolution| resolution.kept().map(|kept| (resolution, kept)))
            .flat_map(|(resolution, kept)| {
                resolution.deletions().map(move |d| DeletionEntry {
                    path: d.path.clone(),
                    size: d.size,
                    kept: kept.path.clone(),
                    category: resolution.category,
                })
            })
            .collect();
        Self { entries }
    }

    /// Planned entries in order.
    pub fn entries(&self) -> &[DeletionEntry] {
        &self.entries
    }

    /// Paths to delete in order.
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.iter().map(|e| &e.path)
    }

    /// Bytes reclaimed if every entry is deleted.
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Number of files to delete.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Paths marked for deletion across all resolutions, in group order.
pub fn deletion_list(resolutions: &[Resolution]) -> Vec<PathBuf> {
    DeletionPlan::from_resolutions(resolutions)
        .entries
        .into_iter()
        .map(|e| e.path)
        .collect()
}
