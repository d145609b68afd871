//! JWalk-based parallel directory scanner.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use twinsift_core::{FileRecord, Inventory, ScanConfig, ScanError, ScanWarning, WarningKind};

use crate::hasher::hash_file;
use crate::progress::{ProgressTracker, ScanPhase, ScanProgress};

/// A progress snapshot is broadcast every this many files.
const PROGRESS_INTERVAL: u64 = 1000;

/// Counters gathered during one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Regular files found.
    pub files: u64,
    /// Directories walked, excluding the root.
    pub dirs: u64,
    /// Symbolic links recorded without being followed.
    pub symlinks: u64,
    /// Combined size of regular files.
    pub total_bytes: u64,
    /// Files hashed successfully.
    pub hashed: u64,
    /// Files whose contents could not be read.
    pub unreadable: u64,
}

/// Everything a scan produces.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Canonicalized root that was scanned.
    pub root: PathBuf,
    /// One record per file or symlink, largest first.
    pub inventory: Inventory,
    /// Scan counters.
    pub stats: ScanStats,
    /// Non-fatal problems met along the way.
    pub warnings: Vec<ScanWarning>,
    /// Wall-clock time of the scan.
    pub duration: Duration,
}

/// A regular file waiting to be hashed.
struct PendingFile {
    path: PathBuf,
    size: u64,
    is_symlink: bool,
}

/// Parallel scanner: jwalk for traversal, rayon for hashing.
pub struct JwalkScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl JwalkScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Walk `config.root` and hash every regular file found.
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();
        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let mut tracker = ProgressTracker::new(start);
        let mut stats = ScanStats::default();
        let mut warnings = Vec::new();
        let mut records = Vec::new();

        let pending = self.collect_entries(
            config,
            &root_path,
            &mut tracker,
            &mut stats,
            &mut records,
            &mut warnings,
        )?;
        info!(
            root = %root_path.display(),
            files = stats.files,
            dirs = stats.dirs,
            symlinks = stats.symlinks,
            "walk complete"
        );

        tracker.set_phase(ScanPhase::Hashing);
        let hashed = match config.threads {
            0 => self.hash_files(pending, &tracker),
            n => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ScanError::InvalidConfig {
                    message: e.to_string(),
                })?
                .install(|| self.hash_files(pending, &tracker)),
        };

        for (record, warning) in hashed {
            match warning {
                Some(warning) => {
                    stats.unreadable += 1;
                    tracker.record_error();
                    warnings.push(warning);
                }
                None => stats.hashed += 1,
            }
            records.push(record);
        }

        let mut inventory = Inventory::new(records);
        inventory.sort_by_size();

        tracker.set_phase(ScanPhase::Done);
        let files_done = stats.hashed + stats.unreadable;
        let _ = self.progress_tx.send(tracker.hashing_snapshot(
            files_done,
            stats.total_bytes,
            &root_path,
        ));

        let duration = start.elapsed();
        info!(
            hashed = stats.hashed,
            unreadable = stats.unreadable,
            warnings = warnings.len(),
            elapsed_ms = duration.as_millis() as u64,
            "scan complete"
        );

        Ok(ScanOutcome {
            root: root_path,
            inventory,
            stats,
            warnings,
            duration,
        })
    }

    /// Walk the tree, returning regular files to hash.
    ///
    /// Unfollowed symlinks go straight into `records`, unhashed.
    fn collect_entries(
        &self,
        config: &ScanConfig,
        root_path: &Path,
        tracker: &mut ProgressTracker,
        stats: &mut ScanStats,
        records: &mut Vec<FileRecord>,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<Vec<PendingFile>, ScanError> {
        let ignore = config.ignore_matcher()?;
        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        // Prune ignored entries before jwalk descends into them.
        let walker = WalkDir::new(root_path)
            .parallelism(parallelism)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .sort(true)
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX))
            .process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|child| match child {
                    Ok(entry) => !ignore.is_match(entry.file_name()),
                    Err(_) => true,
                });
            });

        let mut pending = Vec::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                    warnings.push(ScanWarning::new(path, err.to_string(), WarningKind::ReadError));
                    tracker.record_error();
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let file_type = entry.file_type();

            if file_type.is_dir() {
                stats.dirs += 1;
                tracker.record_dir();
            } else if file_type.is_symlink() {
                stats.symlinks += 1;
                let size = match std::fs::metadata(&path) {
                    Ok(target) => target.len(),
                    Err(_) => {
                        let target = std::fs::read_link(&path)
                            .map(|p| p.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        warnings.push(ScanWarning::broken_symlink(&path, &target));
                        tracker.record_error();
                        0
                    }
                };
                tracker.record_file(path.clone());
                records.push(FileRecord::symlink(path, size, None));
            } else if file_type.is_file() {
                let metadata = match entry.metadata() {
                    Ok(m) => m,
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "skipping file without metadata");
                        warnings.push(ScanWarning::new(
                            &path,
                            err.to_string(),
                            WarningKind::MetadataError,
                        ));
                        tracker.record_error();
                        continue;
                    }
                };

                stats.files += 1;
                stats.total_bytes += metadata.len();
                tracker.record_file(path.clone());
                if tracker.files_found() % PROGRESS_INTERVAL == 0 {
                    let _ = self.progress_tx.send(tracker.snapshot());
                }

                pending.push(PendingFile {
                    path,
                    size: metadata.len(),
                    is_symlink: entry.path_is_symlink(),
                });
            } else {
                debug!(path = %path.display(), "skipping special file");
            }
        }

        Ok(pending)
    }

    /// Hash pending files in parallel, preserving their order.
    fn hash_files(
        &self,
        files: Vec<PendingFile>,
        tracker: &ProgressTracker,
    ) -> Vec<(FileRecord, Option<ScanWarning>)> {
        let files_hashed = AtomicU64::new(0);
        let bytes_hashed = AtomicU64::new(0);

        files
            .into_par_iter()
            .map(|file| {
                let result = hash_file(&file.path);

                let done = files_hashed.fetch_add(1, Ordering::Relaxed) + 1;
                let bytes = bytes_hashed.fetch_add(file.size, Ordering::Relaxed) + file.size;
                if done % PROGRESS_INTERVAL == 0 {
                    let _ = self
                        .progress_tx
                        .send(tracker.hashing_snapshot(done, bytes, &file.path));
                }

                let mut record = FileRecord::unhashed(file.path, file.size);
                record.is_symlink = file.is_symlink;
                match result {
                    Ok(hash) => {
                        record.hash = Some(hash);
                        (record, None)
                    }
                    Err(err) => {
                        warn!(path = %record.path.display(), error = %err, "could not hash file");
                        let warning = ScanWarning::hash_error(&record.path, &err);
                        (record, Some(warning))
                    }
                }
            })
            .collect()
    }
}

impl Default for JwalkScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "hello").unwrap();
        fs::write(root.join("dir2/file4.txt"), "another file here").unwrap();

        temp
    }

    fn record<'a>(outcome: &'a ScanOutcome, relative: &str) -> &'a FileRecord {
        let path = outcome.root.join(relative);
        outcome
            .inventory
            .records()
            .iter()
            .find(|r| r.path == path)
            .unwrap()
    }

    #[test]
    fn test_basic_scan() {
        let temp = create_test_tree();
        let outcome = JwalkScanner::new().scan(&ScanConfig::new(temp.path())).unwrap();

        assert_eq!(outcome.stats.files, 4);
        assert_eq!(outcome.stats.dirs, 3);
        assert_eq!(outcome.stats.hashed, 4);
        assert_eq!(outcome.inventory.len(), 4);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_equal_content_shares_hash() {
        let temp = create_test_tree();
        let outcome = JwalkScanner::new().scan(&ScanConfig::new(temp.path())).unwrap();

        let a = record(&outcome, "file1.txt");
        let b = record(&outcome, "dir1/subdir/file3.txt");
        let c = record(&outcome, "dir1/file2.txt");
        assert_eq!(a.hash, b.hash);
        assert_ne!(a.hash, c.hash);
        assert_eq!(a.size, Some(5));
    }

    #[test]
    fn test_inventory_sorted_by_size() {
        let temp = create_test_tree();
        let outcome = JwalkScanner::new().scan(&ScanConfig::new(temp.path())).unwrap();

        let sizes: Vec<_> = outcome.inventory.records().iter().map(|r| r.size).collect();
        assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_ignore_patterns_prune_directories() {
        let temp = create_test_tree();
        let config = ScanConfig::builder()
            .root(temp.path())
            .ignore_patterns(vec!["dir2".to_string()])
            .build()
            .unwrap();

        let outcome = JwalkScanner::new().scan(&config).unwrap();
        assert_eq!(outcome.stats.files, 3);
        assert!(
            !outcome
                .inventory
                .records()
                .iter()
                .any(|r| r.path.components().any(|c| c.as_os_str() == "dir2"))
        );
    }

    #[test]
    fn test_git_directory_skipped_by_default() {
        let temp = create_test_tree();
        fs::create_dir(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join(".git/HEAD"), "ref: refs/heads/main").unwrap();

        let outcome = JwalkScanner::new().scan(&ScanConfig::new(temp.path())).unwrap();
        assert_eq!(outcome.stats.files, 4);
    }

    #[test]
    fn test_hidden_files_can_be_skipped() {
        let temp = create_test_tree();
        fs::write(temp.path().join(".hidden"), "secret").unwrap();

        let outcome = JwalkScanner::new().scan(&ScanConfig::new(temp.path())).unwrap();
        assert_eq!(outcome.stats.files, 5);

        let config = ScanConfig::builder()
            .root(temp.path())
            .include_hidden(false)
            .build()
            .unwrap();
        let outcome = JwalkScanner::new().scan(&config).unwrap();
        assert_eq!(outcome.stats.files, 4);
    }

    #[test]
    fn test_max_depth() {
        let temp = create_test_tree();
        let config = ScanConfig::builder()
            .root(temp.path())
            .max_depth(1u32)
            .build()
            .unwrap();

        let outcome = JwalkScanner::new().scan(&config).unwrap();
        assert_eq!(outcome.stats.files, 1);
    }

    #[test]
    fn test_dedicated_thread_pool() {
        let temp = create_test_tree();
        let config = ScanConfig::builder()
            .root(temp.path())
            .threads(2usize)
            .build()
            .unwrap();

        let outcome = JwalkScanner::new().scan(&config).unwrap();
        assert_eq!(outcome.stats.hashed, 4);
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp = create_test_tree();
        let err = JwalkScanner::new()
            .scan(&ScanConfig::new(temp.path().join("file1.txt")))
            .unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory { .. }));

        let err = JwalkScanner::new()
            .scan(&ScanConfig::new(temp.path().join("missing")))
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn test_final_progress_is_broadcast() {
        let temp = create_test_tree();
        let scanner = JwalkScanner::new();
        let mut rx = scanner.subscribe();
        scanner.scan(&ScanConfig::new(temp.path())).unwrap();

        let mut last = None;
        while let Ok(progress) = rx.try_recv() {
            last = Some(progress);
        }
        let last = last.unwrap();
        assert_eq!(last.phase, ScanPhase::Done);
        assert_eq!(last.files_found, 4);
        assert_eq!(last.files_hashed, 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_recorded_without_hash() {
        let temp = create_test_tree();
        std::os::unix::fs::symlink(temp.path().join("file1.txt"), temp.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(temp.path().join("nowhere"), temp.path().join("broken"))
            .unwrap();

        let outcome = JwalkScanner::new().scan(&ScanConfig::new(temp.path())).unwrap();
        assert_eq!(outcome.stats.symlinks, 2);

        let link = record(&outcome, "link.txt");
        assert!(link.is_symlink);
        assert!(link.hash.is_none());
        assert_eq!(link.size, Some(5));

        assert!(
            outcome
                .warnings
                .iter()
                .any(|w| w.kind == WarningKind::BrokenSymlink)
        );
    }
}
