//! Partitioning validated records into duplicate groups.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use twinsift_core::{format_size, ContentHash, HashedFile};

use crate::config::GroupKey;
use crate::error::AnalyzeError;
use crate::prefix::{common_ancestor, rejoin};

/// One file of a duplicate group, decomposed against the group's ancestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMember {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Directory of the file relative to the common ancestor (may be empty).
    pub relative_folder: PathBuf,
    /// Final path component.
    #[serde(serialize_with = "serialize_lossy")]
    pub filename: OsString,
}

impl GroupMember {
    /// File name as text, the form used for ordering.
    pub fn name_key(&self) -> String {
        self.filename.to_string_lossy().into_owned()
    }

    /// Relative folder as text, the form used for ordering and pairing.
    pub fn folder_key(&self) -> String {
        self.relative_folder.to_string_lossy().into_owned()
    }

    /// Check whether the file sits directly in the common ancestor.
    pub fn at_ancestor(&self) -> bool {
        self.relative_folder.as_os_str().is_empty()
    }
}

/// A set of two or more files with the same content.
///
/// Built only through [`DuplicateGroup::new`], which guarantees every member
/// path is `common_ancestor / relative_folder / filename`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    hash: ContentHash,
    size_human: String,
    common_ancestor: PathBuf,
    members: Vec<GroupMember>,
}

impl DuplicateGroup {
    /// Build a group from files sharing one content hash.
    ///
    /// Fails on fewer than two files, mixed hashes, repeated paths, or a
    /// member that does not decompose against the common ancestor.
    pub fn new(files: Vec<HashedFile>) -> Result<Self, AnalyzeError> {
        let Some(first) = files.first() else {
            return Err(AnalyzeError::invalid_group(
                &ContentHash::new(""),
                "group has no members",
            ));
        };
        let hash = first.hash.clone();
        let size_human = format_size(first.size);

        if files.len() < 2 {
            return Err(AnalyzeError::invalid_group(&hash, "group has a single member"));
        }
        if let Some(other) = files.iter().find(|f| f.hash != hash) {
            return Err(AnalyzeError::invalid_group(
                &hash,
                format!("{} has hash {}", other.path.display(), other.hash),
            ));
        }
        let mut seen = HashSet::with_capacity(files.len());
        if let Some(repeat) = files.iter().find(|f| !seen.insert(f.path.as_path())) {
            return Err(AnalyzeError::invalid_group(
                &hash,
                format!("{} appears more than once", repeat.path.display()),
            ));
        }

        let folders: Vec<&Path> = files.iter().map(HashedFile::folder).collect();
        let common_ancestor = common_ancestor(&folders);

        let mut members = Vec::with_capacity(files.len());
        for file in &files {
            let relative_folder = file
                .folder()
                .strip_prefix(&common_ancestor)
                .map_err(|_| AnalyzeError::OutsideAncestor {
                    path: file.path.clone(),
                    ancestor: common_ancestor.clone(),
                })?
                .to_path_buf();
            let filename = file.file_name().to_os_string();
            if filename.is_empty() {
                return Err(AnalyzeError::invalid_group(
                    &hash,
                    format!("{} has no file name", file.path.display()),
                ));
            }
            let member = GroupMember {
                path: file.path.clone(),
                size: file.size,
                relative_folder,
                filename,
            };
            let rebuilt = rejoin(&common_ancestor, &member.relative_folder, &member.filename);
            if rebuilt != member.path {
                return Err(AnalyzeError::invalid_group(
                    &hash,
                    format!(
                        "{} does not rebuild from its parts (got {})",
                        member.path.display(),
                        rebuilt.display()
                    ),
                ));
            }
            members.push(member);
        }

        Ok(Self {
            hash,
            size_human,
            common_ancestor,
            members,
        })
    }

    /// Content hash shared by all members.
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Formatted size of the group's files.
    pub fn size_human(&self) -> &str {
        &self.size_human
    }

    /// Longest directory prefix shared by all members.
    pub fn common_ancestor(&self) -> &Path {
        &self.common_ancestor
    }

    /// Members in inventory order.
    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    /// Number of members (at least two).
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Combined size of all members.
    pub fn total_size(&self) -> u64 {
        self.members.iter().map(|m| m.size).sum()
    }

    /// Bytes held by every member except the first: what removing the
    /// redundant copies would reclaim.
    pub fn wasted_bytes(&self) -> u64 {
        self.members.iter().skip(1).map(|m| m.size).sum()
    }

    /// Check whether any member lives below the common ancestor.
    pub fn has_nested_folders(&self) -> bool {
        self.members.iter().any(|m| !m.at_ancestor())
    }

    /// Rebuild a member's absolute path from its decomposition.
    pub fn member_path(&self, member: &GroupMember) -> PathBuf {
        rejoin(&self.common_ancestor, &member.relative_folder, &member.filename)
    }
}

fn serialize_lossy<S: Serializer>(name: &OsString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&name.to_string_lossy())
}

/// Partition validated files into duplicate groups.
///
/// Files are keyed by (hash, size key) in a single pass; partitions with a
/// single file are dropped. Groups come out by total size descending, ties
/// in the order their first member was seen.
pub fn group_duplicates(
    files: &[HashedFile],
    key: GroupKey,
) -> Result<Vec<DuplicateGroup>, AnalyzeError> {
    let mut partitions: IndexMap<_, Vec<HashedFile>> = IndexMap::new();
    for file in files {
        partitions
            .entry((file.hash.clone(), key.size_key(file.size)))
            .or_default()
            .push(file.clone());
    }

    let mut groups = partitions
        .into_values()
        .filter(|members| members.len() >= 2)
        .map(DuplicateGroup::new)
        .collect::<Result<Vec<_>, _>>()?;

    groups.sort_by(|a, b| b.total_size().cmp(&a.total_size()));

    debug!(
        files = files.len(),
        groups = groups.len(),
        key = %key,
        "partitioned files into duplicate groups"
    );

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, size: u64, hash: &str) -> HashedFile {
        HashedFile {
            path: PathBuf::from(path),
            size,
            hash: ContentHash::new(hash),
            is_symlink: false,
        }
    }

    #[test]
    fn test_same_folder_decomposition() {
        let group =
            DuplicateGroup::new(vec![file("/a/b/x.txt", 5, "h"), file("/a/b/y.txt", 5, "h")])
                .unwrap();
        assert_eq!(group.common_ancestor(), Path::new("/a/b"));
        assert!(group.members().iter().all(GroupMember::at_ancestor));
        assert_eq!(group.members()[0].filename, "x.txt");
        assert!(!group.has_nested_folders());
    }

    #[test]
    fn test_nested_decomposition_reconstructs_paths() {
        let group = DuplicateGroup::new(vec![
            file("/a/f.txt", 5, "h"),
            file("/a/b1/f.txt", 5, "h"),
            file("/a/b2/deep/g.txt", 5, "h"),
        ])
        .unwrap();
        assert_eq!(group.common_ancestor(), Path::new("/a"));
        let folders: Vec<_> = group.members().iter().map(GroupMember::folder_key).collect();
        assert_eq!(folders, vec!["", "b1", "b2/deep"]);
        for member in group.members() {
            assert_eq!(group.member_path(member), member.path);
        }
    }

    #[test]
    fn test_rejects_single_member() {
        let err = DuplicateGroup::new(vec![file("/a/x", 5, "h")]).unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidGroup { .. }));
    }

    #[test]
    fn test_rejects_mixed_hashes() {
        let err = DuplicateGroup::new(vec![file("/a/x", 5, "h"), file("/a/y", 5, "other")])
            .unwrap_err();
        assert!(err.to_string().contains("other"));
    }

    #[test]
    fn test_rejects_repeated_path() {
        let err = DuplicateGroup::new(vec![file("/a/x", 5, "h"), file("/a/x", 5, "h")])
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_group_order_by_total_size() {
        let files = vec![
            file("/s/a", 10, "small"),
            file("/s/b", 10, "small"),
            file("/l/a", 100, "large"),
            file("/l/b", 100, "large"),
            file("/u/only", 1000, "unique"),
            file("/t/a", 10, "tie"),
            file("/t/b", 10, "tie"),
        ];
        let groups = group_duplicates(&files, GroupKey::ExactSize).unwrap();
        let hashes: Vec<_> = groups.iter().map(|g| g.hash().as_str()).collect();
        assert_eq!(hashes, vec!["large", "small", "tie"]);
    }

    #[test]
    fn test_exact_key_splits_sizes() {
        let files = vec![file("/a/x", 1_048_576, "h"), file("/a/y", 1_052_770, "h")];
        assert!(group_duplicates(&files, GroupKey::ExactSize).unwrap().is_empty());
        let loose = group_duplicates(&files, GroupKey::FormattedSize).unwrap();
        assert_eq!(loose.len(), 1);
        assert_eq!(loose[0].size_human(), "1.0 MB");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_rebuild_exactly() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let odd = Path::new(OsStr::from_bytes(b"/a/b/caf\xE9 (1).txt")).to_path_buf();
        let mut copy = file("/a/b/cafe.txt", 5, "h");
        copy.path = odd.clone();
        let group = DuplicateGroup::new(vec![file("/a/b/cafe.txt", 5, "h"), copy]).unwrap();

        let member = &group.members()[1];
        assert_eq!(member.filename.as_bytes(), b"caf\xE9 (1).txt");
        assert_eq!(group.member_path(member), odd);
    }
}
