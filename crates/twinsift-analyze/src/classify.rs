//! Keep/delete classification of duplicate groups.
//!
//! Two group shapes are resolved automatically:
//!
//! - **same folder, different names**: every copy sits directly in the
//!   common ancestor. The shortest file name is kept, so `report.pdf` wins
//!   over `report (1).pdf`.
//! - **different folders, same name**: every copy has the same file name.
//!   The copy in the shortest relative folder is kept.
//!
//! Ties on length go to the alphabetically earliest name, compared without
//! case. Every other shape is left for manual review.

use std::cmp::Reverse;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use twinsift_core::ContentHash;

use crate::group::{DuplicateGroup, GroupMember};

/// Structural pattern of an automatically resolvable group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionCategory {
    /// All copies in one folder under different names.
    SameFolderDiffName,
    /// Copies in different folders under one name.
    DiffFolderSameName,
}

impl ResolutionCategory {
    /// Every category, in classification order.
    pub const ALL: [ResolutionCategory; 2] = [
        ResolutionCategory::SameFolderDiffName,
        ResolutionCategory::DiffFolderSameName,
    ];
}

/// Keep or delete verdict for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Whether this copy is kept.
    pub keep: bool,
}

/// Automatic decisions for one duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Hash of the resolved group.
    pub hash: ContentHash,
    /// Shape that made the group resolvable.
    pub category: ResolutionCategory,
    /// One decision per member, exactly one of them kept.
    pub decisions: Vec<Decision>,
}

impl Resolution {
    /// The kept copy, `None` only for a hand-built resolution without one.
    pub fn kept(&self) -> Option<&Decision> {
        self.decisions.iter().find(|d| d.keep)
    }

    /// Copies marked for deletion, in decision order.
    pub fn deletions(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.iter().filter(|d| !d.keep)
    }
}

/// Classify a duplicate group, returning `None` when it needs manual review.
pub fn classify(group: &DuplicateGroup) -> Option<Resolution> {
    let members = group.members();

    if members.iter().all(GroupMember::at_ancestor) {
        let ordered = order_by_name_key(members, GroupMember::name_key);
        return Some(resolve(group, ResolutionCategory::SameFolderDiffName, ordered));
    }

    let first_name = &members[0].filename;
    if members.iter().all(|m| &m.filename == first_name) {
        let ordered = order_by_name_key(members, GroupMember::folder_key);
        return Some(resolve(group, ResolutionCategory::DiffFolderSameName, ordered));
    }

    None
}

/// Order members by (length, lowercase) descending, keeping input order on
/// ties. The preferred copy ends up last.
fn order_by_name_key<F>(members: &[GroupMember], name: F) -> Vec<&GroupMember>
where
    F: Fn(&GroupMember) -> String,
{
    let mut ordered: Vec<&GroupMember> = members.iter().collect();
    ordered.sort_by_cached_key(|m| {
        let text = name(*m);
        Reverse((text.chars().count(), text.to_lowercase()))
    });
    ordered
}

fn resolve(
    group: &DuplicateGroup,
    category: ResolutionCategory,
    ordered: Vec<&GroupMember>,
) -> Resolution {
    let last = ordered.len() - 1;
    let decisions = ordered
        .into_iter()
        .enumerate()
        .map(|(i, member)| Decision {
            path: group.member_path(member),
            size: member.size,
            keep: i == last,
        })
        .collect();

    Resolution {
        hash: group.hash().clone(),
        category,
        decisions,
    }
}
