//! Analysis configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use twinsift_core::{format_size, ValidationRules};

use crate::classify::ResolutionCategory;

/// Second component of the duplicate grouping key, next to the content hash.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum GroupKey {
    /// Exact byte size.
    #[default]
    #[serde(rename = "exact")]
    #[strum(to_string = "exact")]
    ExactSize,
    /// Human-formatted size string. Files of slightly different sizes that
    /// round to the same string share a key, so hash collisions across them
    /// would merge.
    #[serde(rename = "formatted")]
    #[strum(to_string = "formatted")]
    FormattedSize,
}

/// Size part of a grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum SizeKey {
    Exact(u64),
    Formatted(String),
}

impl GroupKey {
    pub(crate) fn size_key(self, size: u64) -> SizeKey {
        match self {
            GroupKey::ExactSize => SizeKey::Exact(size),
            GroupKey::FormattedSize => SizeKey::Formatted(format_size(size)),
        }
    }
}

/// Configuration for duplicate analysis.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct AnalyzeConfig {
    /// How file sizes take part in the grouping key.
    #[builder(default)]
    #[serde(default)]
    pub group_key: GroupKey,

    /// Resolution categories whose decisions feed the deletion plan.
    #[builder(default = "ResolutionCategory::ALL.to_vec()")]
    #[serde(default = "default_auto_delete")]
    pub auto_delete: Vec<ResolutionCategory>,

    /// Folder names whose contents are left out of the analysis.
    #[builder(default = "default_ignore_folders()")]
    #[serde(default = "default_ignore_folders")]
    pub ignore_folders: Vec<String>,

    /// Analyze symbolic link records alongside regular files.
    #[builder(default = "false")]
    #[serde(default)]
    pub include_symlinks: bool,

    /// Maximum number of folder pairs to report (0 = unlimited).
    #[builder(default = "0")]
    #[serde(default)]
    pub max_pairs: usize,
}

fn default_auto_delete() -> Vec<ResolutionCategory> {
    ResolutionCategory::ALL.to_vec()
}

fn default_ignore_folders() -> Vec<String> {
    vec![".git".to_string()]
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            group_key: GroupKey::default(),
            auto_delete: default_auto_delete(),
            ignore_folders: default_ignore_folders(),
            include_symlinks: false,
            max_pairs: 0,
        }
    }
}

impl AnalyzeConfig {
    /// Create a new config builder.
    pub fn builder() -> AnalyzeConfigBuilder {
        AnalyzeConfigBuilder::default()
    }

    /// Rules for the validation filter run before grouping.
    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            ignore_folders: self.ignore_folders.clone(),
            include_symlinks: self.include_symlinks,
        }
    }

    /// Check whether a category's decisions are turned into deletions.
    pub fn deletes(&self, category: ResolutionCategory) -> bool {
        self.auto_delete.contains(&category)
    }
}
