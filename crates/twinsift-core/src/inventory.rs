//! File inventories and the validation filter applied before grouping.

use std::ffi::OsStr;

use serde::{Deserialize, Serialize};

use crate::record::{FileRecord, HashedFile};

/// A flat list of file records from one scan or one inventory file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    records: Vec<FileRecord>,
}

impl Inventory {
    /// Create an inventory from records.
    pub fn new(records: Vec<FileRecord>) -> Self {
        Self { records }
    }

    /// All records, in inventory order.
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Consume the inventory, returning its records.
    pub fn into_records(self) -> Vec<FileRecord> {
        self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the inventory holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sort records by size descending, then path, as written to disk.
    pub fn sort_by_size(&mut self) {
        self.records.sort_by(|a, b| {
            b.size
                .unwrap_or(0)
                .cmp(&a.size.unwrap_or(0))
                .then_with(|| a.path.cmp(&b.path))
        });
    }

    /// Filter the inventory down to records eligible for duplicate grouping.
    ///
    /// Every dropped record is counted under the first rule it fails, so the
    /// exclusion total always equals `len() - validated.len()`.
    pub fn validate(&self, rules: &ValidationRules) -> ValidatedInventory {
        let mut files = Vec::with_capacity(self.records.len());
        let mut excluded = ExclusionStats::default();

        for record in &self.records {
            let Some(hash) = record.hash.as_ref().filter(|h| !h.as_str().is_empty()) else {
                excluded.missing_hash += 1;
                continue;
            };
            let Some(size) = record.size else {
                excluded.missing_size += 1;
                continue;
            };
            if size == 0 {
                excluded.empty += 1;
                continue;
            }
            if record.is_symlink && !rules.include_symlinks {
                excluded.symlink += 1;
                continue;
            }
            if rules.in_ignored_folder(record) {
                excluded.ignored_folder += 1;
                continue;
            }

            files.push(HashedFile {
                path: record.path.clone(),
                size,
                hash: hash.clone(),
                is_symlink: record.is_symlink,
            });
        }

        ValidatedInventory { files, excluded }
    }
}

impl From<Vec<FileRecord>> for Inventory {
    fn from(records: Vec<FileRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<FileRecord> for Inventory {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Rules deciding which records take part in duplicate grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    /// Records below a directory with one of these names are dropped.
    pub ignore_folders: Vec<String>,
    /// Keep symbolic link records.
    pub include_symlinks: bool,
}

impl ValidationRules {
    fn in_ignored_folder(&self, record: &FileRecord) -> bool {
        let Some(parent) = record.path.parent() else {
            return false;
        };
        parent.components().any(|c| {
            let name = c.as_os_str();
            self.ignore_folders.iter().any(|f| name == OsStr::new(f))
        })
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            ignore_folders: vec![".git".to_string()],
            include_symlinks: false,
        }
    }
}

/// Per-reason counts of records dropped by validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionStats {
    /// Records without a content hash (unreadable files).
    pub missing_hash: u64,
    /// Records without a usable size.
    pub missing_size: u64,
    /// Zero-byte files.
    pub empty: u64,
    /// Symbolic links, when not included.
    pub symlink: u64,
    /// Records inside an ignored folder.
    pub ignored_folder: u64,
}

impl ExclusionStats {
    /// Total number of excluded records.
    pub fn total(&self) -> u64 {
        self.missing_hash + self.missing_size + self.empty + self.symlink + self.ignored_folder
    }
}

/// Records that passed validation, plus what was dropped and why.
#[derive(Debug, Clone, Default)]
pub struct ValidatedInventory {
    /// Eligible records in inventory order.
    pub files: Vec<HashedFile>,
    /// Exclusion counts.
    pub excluded: ExclusionStats,
}

impl ValidatedInventory {
    /// Number of eligible records.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check whether no record survived validation.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
