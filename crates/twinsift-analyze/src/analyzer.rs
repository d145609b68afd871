//! End-to-end duplicate analysis of an inventory.

use serde::Serialize;
use tracing::{debug, info};

use twinsift_core::{format_size, ExclusionStats, Inventory, ValidatedInventory};

use crate::classify::{classify, Resolution, ResolutionCategory};
use crate::config::AnalyzeConfig;
use crate::cooccurrence::{folder_cooccurrence, FolderPair};
use crate::deletion::DeletionPlan;
use crate::error::AnalyzeError;
use crate::group::{group_duplicates, DuplicateGroup};

/// Headline numbers of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    /// Records in the inventory.
    pub records_total: u64,
    /// Records that passed validation.
    pub records_analyzed: u64,
    /// Records dropped by validation, per reason.
    pub excluded: ExclusionStats,
    /// Number of duplicate groups.
    pub group_count: usize,
    /// Files belonging to a duplicate group.
    pub duplicate_files: u64,
    /// Bytes held by all but the first copy of every group.
    pub duplicate_volume_bytes: u64,
    /// `duplicate_volume_bytes`, formatted.
    pub duplicate_volume: String,
    /// Groups resolved as same folder, different names.
    pub same_folder_groups: usize,
    /// Groups resolved as different folders, same name.
    pub diff_folder_groups: usize,
    /// Groups left for manual review.
    pub unresolved_groups: usize,
    /// Files in the deletion plan.
    pub files_to_delete: usize,
    /// Bytes reclaimed by the deletion plan.
    pub bytes_to_delete: u64,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    /// Duplicate groups, largest first.
    pub groups: Vec<DuplicateGroup>,
    /// Automatic resolutions, in group order.
    pub resolutions: Vec<Resolution>,
    /// Indices into `groups` of groups needing manual review.
    pub unresolved: Vec<usize>,
    /// Files recommended for deletion.
    pub deletion_plan: DeletionPlan,
    /// Folder pairs ranked by how many groups they share.
    pub folder_pairs: Vec<FolderPair>,
    /// Headline numbers.
    pub summary: AnalysisSummary,
}

impl AnalysisReport {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Groups that could not be resolved automatically.
    pub fn unresolved_groups(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.unresolved.iter().map(|&i| &self.groups[i])
    }
}

/// Duplicate analysis pipeline.
///
/// Validates the inventory, groups duplicates, then feeds the same group list
/// to the classifier (and from there the deletion plan) and to the folder
/// co-occurrence counter.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzeConfig,
}

impl Analyzer {
    /// Create an analyzer with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with custom config.
    pub fn with_config(config: AnalyzeConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &AnalyzeConfig {
        &self.config
    }

    /// Analyze an inventory.
    pub fn analyze(&self, inventory: &Inventory) -> Result<AnalysisReport, AnalyzeError> {
        let validated = inventory.validate(&self.config.validation_rules());
        info!(
            records = inventory.len(),
            analyzed = validated.len(),
            excluded = validated.excluded.total(),
            symlinks_excluded = validated.excluded.symlink,
            "validated inventory"
        );
        self.analyze_validated(inventory.len() as u64, validated)
    }

    /// Analyze records that already passed validation.
    pub fn analyze_validated(
        &self,
        records_total: u64,
        validated: ValidatedInventory,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let groups = group_duplicates(&validated.files, self.config.group_key)?;

        let mut resolutions = Vec::new();
        let mut unresolved = Vec::new();
        for (index, group) in groups.iter().enumerate() {
            match classify(group) {
                Some(resolution) => {
                    debug!(
                        hash = %group.hash(),
                        category = %resolution.category,
                        kept = ?resolution.kept().map(|d| &d.path),
                        "resolved duplicate group"
                    );
                    resolutions.push(resolution);
                }
                None => {
                    debug!(
                        hash = %group.hash(),
                        ancestor = %group.common_ancestor().display(),
                        members = group.member_count(),
                        "duplicate group needs review"
                    );
                    unresolved.push(index);
                }
            }
        }

        let deletion_plan = DeletionPlan::from_resolutions(
            resolutions
                .iter()
                .filter(|r| self.config.deletes(r.category)),
        );

        let mut folder_pairs = folder_cooccurrence(&groups);
        if self.config.max_pairs > 0 {
            folder_pairs.truncate(self.config.max_pairs);
        }

        let count_category = |category: ResolutionCategory| {
            resolutions.iter().filter(|r| r.category == category).count()
        };
        let duplicate_volume_bytes: u64 = groups.iter().map(DuplicateGroup::wasted_bytes).sum();
        let summary = AnalysisSummary {
            records_total,
            records_analyzed: validated.len() as u64,
            excluded: validated.excluded,
            group_count: groups.len(),
            duplicate_files: groups.iter().map(|g| g.member_count() as u64).sum(),
            duplicate_volume_bytes,
            duplicate_volume: format_size(duplicate_volume_bytes),
            same_folder_groups: count_category(ResolutionCategory::SameFolderDiffName),
            diff_folder_groups: count_category(ResolutionCategory::DiffFolderSameName),
            unresolved_groups: unresolved.len(),
            files_to_delete: deletion_plan.len(),
            bytes_to_delete: deletion_plan.total_bytes(),
        };

        info!(
            groups = summary.group_count,
            resolved = resolutions.len(),
            unresolved = summary.unresolved_groups,
            files_to_delete = summary.files_to_delete,
            volume = %summary.duplicate_volume,
            "analysis complete"
        );

        Ok(AnalysisReport {
            groups,
            resolutions,
            unresolved,
            deletion_plan,
            folder_pairs,
            summary,
        })
    }
}
