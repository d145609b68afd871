//! Scan progress reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Stage a scan is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Walking the directory tree.
    Walking,
    /// Hashing file contents.
    Hashing,
    /// Scan finished.
    Done,
}

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Current stage.
    pub phase: ScanPhase,
    /// Regular files and symlinks found so far.
    pub files_found: u64,
    /// Directories walked so far.
    pub dirs_scanned: u64,
    /// Files hashed so far.
    pub files_hashed: u64,
    /// Bytes hashed so far.
    pub bytes_hashed: u64,
    /// Last path seen.
    pub current_path: PathBuf,
    /// Number of warnings encountered.
    pub errors_count: u64,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            phase: ScanPhase::Walking,
            files_found: 0,
            dirs_scanned: 0,
            files_hashed: 0,
            bytes_hashed: 0,
            current_path: PathBuf::new(),
            errors_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Hashing rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_hashed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Hashing rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.bytes_hashed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Running counters of one scan, snapshotted into [`ScanProgress`].
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    phase: ScanPhase,
    files_found: u64,
    dirs_scanned: u64,
    errors_count: u64,
    current_path: PathBuf,
}

impl ProgressTracker {
    pub fn new(start_time: Instant) -> Self {
        Self {
            start_time,
            phase: ScanPhase::Walking,
            files_found: 0,
            dirs_scanned: 0,
            errors_count: 0,
            current_path: PathBuf::new(),
        }
    }

    pub fn record_file(&mut self, path: PathBuf) {
        self.files_found += 1;
        self.current_path = path;
    }

    pub fn record_dir(&mut self) {
        self.dirs_scanned += 1;
    }

    pub fn record_error(&mut self) {
        self.errors_count += 1;
    }

    pub fn set_phase(&mut self, phase: ScanPhase) {
        self.phase = phase;
    }

    pub fn files_found(&self) -> u64 {
        self.files_found
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            phase: self.phase,
            files_found: self.files_found,
            dirs_scanned: self.dirs_scanned,
            files_hashed: 0,
            bytes_hashed: 0,
            current_path: self.current_path.clone(),
            errors_count: self.errors_count,
            elapsed: self.start_time.elapsed(),
        }
    }

    /// Snapshot taken mid-hash, with the shared hashing counters filled in.
    pub fn hashing_snapshot(
        &self,
        files_hashed: u64,
        bytes_hashed: u64,
        path: &std::path::Path,
    ) -> ScanProgress {
        ScanProgress {
            files_hashed,
            bytes_hashed,
            current_path: path.to_path_buf(),
            ..self.snapshot()
        }
    }
}
