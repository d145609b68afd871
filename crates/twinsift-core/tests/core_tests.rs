use std::path::PathBuf;

use twinsift_core::{
    format_size, ContentHash, FileRecord, Inventory, ScanConfig, ValidationRules,
};

#[test]
fn test_validation_accounts_for_every_record() {
    let inventory: Inventory = vec![
        FileRecord::new("/d/a.txt", 10, ContentHash::new("h1")),
        FileRecord::new("/d/b.txt", 10, ContentHash::new("")),
        FileRecord::unhashed("/d/c.txt", 10),
        FileRecord::new("/d/empty", 0, ContentHash::new("h2")),
        FileRecord::symlink("/d/link", 10, Some(ContentHash::new("h1"))),
        FileRecord::new("/d/.git/objects/ab", 10, ContentHash::new("h3")),
        FileRecord {
            path: PathBuf::from("/d/nosize"),
            size: None,
            hash: Some(ContentHash::new("h4")),
            is_symlink: false,
        },
    ]
    .into();

    let validated = inventory.validate(&ValidationRules::default());
    assert_eq!(validated.len(), 1);
    assert_eq!(validated.files[0].path, PathBuf::from("/d/a.txt"));
    assert_eq!(validated.excluded.missing_hash, 2);
    assert_eq!(validated.excluded.missing_size, 1);
    assert_eq!(validated.excluded.empty, 1);
    assert_eq!(validated.excluded.symlink, 1);
    assert_eq!(validated.excluded.ignored_folder, 1);
    assert_eq!(
        validated.excluded.total() as usize + validated.len(),
        inventory.len()
    );
}

#[test]
fn test_symlinks_kept_when_requested() {
    let inventory: Inventory = [FileRecord::symlink("/d/link", 10, Some(ContentHash::new("h")))]
        .into_iter()
        .collect();
    let rules = ValidationRules {
        include_symlinks: true,
        ..ValidationRules::default()
    };
    let validated = inventory.validate(&rules);
    assert_eq!(validated.len(), 1);
    assert!(validated.files[0].is_symlink);
}

#[test]
fn test_ignored_folder_matches_whole_component() {
    let inventory = Inventory::new(vec![
        FileRecord::new("/d/.github/ci.yml", 10, ContentHash::new("h")),
        FileRecord::new("/d/.git", 10, ContentHash::new("h")),
    ]);
    let validated = inventory.validate(&ValidationRules::default());
    assert_eq!(validated.len(), 2);
}

#[test]
fn test_sort_by_size_descending() {
    let mut inventory = Inventory::new(vec![
        FileRecord::new("/b", 5, ContentHash::new("x")),
        FileRecord::new("/a", 5, ContentHash::new("y")),
        FileRecord::new("/c", 50, ContentHash::new("z")),
    ]);
    inventory.sort_by_size();
    let paths: Vec<_> = inventory.records().iter().map(|r| r.path.clone()).collect();
    assert_eq!(
        paths,
        vec![PathBuf::from("/c"), PathBuf::from("/a"), PathBuf::from("/b")]
    );
}

#[test]
fn test_record_accepts_legacy_field_names() {
    let json = r#"[
        {"file_path": "/x/a.txt", "file_size": 12, "file_md5": "abc", "is_symlink": "False"},
        {"file_path": "/x/b.txt", "file_size": "n/a", "file_md5": null, "is_symlink": 1}
    ]"#;
    let inventory: Inventory = serde_json::from_str(json).unwrap();
    let records = inventory.records();
    assert_eq!(records[0].size, Some(12));
    assert_eq!(records[0].hash, Some(ContentHash::new("abc")));
    assert!(!records[0].is_symlink);
    assert_eq!(records[1].size, None);
    assert_eq!(records[1].hash, None);
    assert!(records[1].is_symlink);
}

#[test]
fn test_format_size_boundaries() {
    assert_eq!(format_size(0), "0B");
    assert_eq!(format_size(1023), "1023.0 B");
    assert_eq!(format_size(1024), "1.0 KB");
    assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    assert_eq!(format_size(1024u64.pow(4) * 3 / 2), "1.5 TB");
}

#[test]
fn test_scan_config_defaults() {
    let config = ScanConfig::new("/tmp");
    assert!(!config.follow_symlinks);
    assert!(config.include_hidden);
    let matcher = config.ignore_matcher().unwrap();
    assert!(matcher.is_match(".git"));
    assert!(!matcher.is_match("src"));
}
