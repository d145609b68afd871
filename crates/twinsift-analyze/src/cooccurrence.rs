//! Folder co-occurrence across duplicate groups.
//!
//! Two folders that keep showing up together as homes of the same content
//! are likely whole-directory copies of each other. Counting, per common
//! ancestor, how many groups each folder pair shares surfaces those
//! candidates for a manual merge.

use std::path::PathBuf;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

use crate::group::{DuplicateGroup, GroupMember};

/// Number of duplicate groups in which two relative folders appear together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderPair {
    /// Ancestor the folders are relative to.
    pub common_ancestor: PathBuf,
    /// Lexicographically smaller folder (may be empty: the ancestor itself).
    pub folder_a: String,
    /// Lexicographically larger folder.
    pub folder_b: String,
    /// Number of distinct groups holding copies in both folders.
    pub count: u64,
}

impl FolderPair {
    /// Absolute paths of both folders.
    pub fn absolute_folders(&self) -> (PathBuf, PathBuf) {
        let resolve = |folder: &str| {
            if folder.is_empty() {
                self.common_ancestor.clone()
            } else {
                self.common_ancestor.join(folder)
            }
        };
        (resolve(&self.folder_a), resolve(&self.folder_b))
    }
}

/// Count folder pairs across groups with non-trivial folder structure.
///
/// Groups whose copies all sit directly in the common ancestor contribute
/// nothing. Each qualifying group counts every unordered pair of its distinct
/// relative folders once. Pairs come out by count descending, ties in the
/// order they were first seen.
pub fn folder_cooccurrence(groups: &[DuplicateGroup]) -> Vec<FolderPair> {
    let mut counts: IndexMap<(PathBuf, String, String), u64> = IndexMap::new();

    for group in groups.iter().filter(|g| g.has_nested_folders()) {
        let folders: Vec<String> = group
            .members()
            .iter()
            .map(GroupMember::folder_key)
            .sorted()
            .dedup()
            .collect();

        for (a, b) in folders.iter().tuple_combinations() {
            *counts
                .entry((group.common_ancestor().to_path_buf(), a.clone(), b.clone()))
                .or_insert(0) += 1;
        }
    }

    let mut pairs: Vec<FolderPair> = counts
        .into_iter()
        .map(|((common_ancestor, folder_a, folder_b), count)| FolderPair {
            common_ancestor,
            folder_a,
            folder_b,
            count,
        })
        .collect();
    pairs.sort_by(|x, y| y.count.cmp(&x.count));
    pairs
}
