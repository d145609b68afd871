//! Reading and writing inventory files.
//!
//! Two formats are supported: CSV with one row per record (the default) and
//! a JSON array of records. Written inventories are sorted largest first.
//! CSV input also accepts the `file_path`, `file_size` and `file_md5` column
//! names used by older inventory reports.
//!
//! Both formats store paths as text, so a record whose path is not valid
//! UTF-8 is left out of the written file and reported as a [`ScanWarning`].

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use twinsift_core::{FileRecord, Inventory, InventoryError, ScanWarning};

/// On-disk inventory format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryFormat {
    /// Comma-separated rows with a header.
    Csv,
    /// A JSON array of records.
    Json,
}

impl InventoryFormat {
    /// Pick the format from a file extension: `.json` is JSON, anything else CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Load an inventory, choosing the format from the extension.
pub fn load_inventory(path: &Path) -> Result<Inventory, InventoryError> {
    let inventory = match InventoryFormat::from_path(path) {
        InventoryFormat::Csv => read_csv(path)?,
        InventoryFormat::Json => read_json(path)?,
    };
    info!(path = %path.display(), records = inventory.len(), "loaded inventory");
    Ok(inventory)
}

/// Save an inventory, choosing the format from the extension.
///
/// Returns one warning per record that could not be written.
pub fn save_inventory(
    path: &Path,
    inventory: &Inventory,
) -> Result<Vec<ScanWarning>, InventoryError> {
    let warnings = match InventoryFormat::from_path(path) {
        InventoryFormat::Csv => write_csv(path, inventory)?,
        InventoryFormat::Json => write_json(path, inventory)?,
    };
    info!(
        path = %path.display(),
        records = inventory.len() - warnings.len(),
        skipped = warnings.len(),
        "saved inventory"
    );
    Ok(warnings)
}

/// Read a CSV inventory.
pub fn read_csv(path: &Path) -> Result<Inventory, InventoryError> {
    let file = File::open(path).map_err(|e| InventoryError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let mut records = Vec::new();
    for row in reader.deserialize::<FileRecord>() {
        records.push(row.map_err(|e| csv_error(path, e))?);
    }
    debug!(path = %path.display(), rows = records.len(), "parsed csv inventory");
    Ok(Inventory::new(records))
}

/// Write a CSV inventory, largest files first.
pub fn write_csv(
    path: &Path,
    inventory: &Inventory,
) -> Result<Vec<ScanWarning>, InventoryError> {
    let (inventory, warnings) = writable(inventory);
    let file = File::create(path).map_err(|e| InventoryError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    for record in inventory.records() {
        writer.serialize(record).map_err(|e| csv_error(path, e))?;
    }
    writer.flush().map_err(|e| InventoryError::io(path, e))?;
    Ok(warnings)
}

/// Read a JSON inventory.
pub fn read_json(path: &Path) -> Result<Inventory, InventoryError> {
    let file = File::open(path).map_err(|e| InventoryError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| json_error(path, e))
}

/// Write a JSON inventory, largest files first.
pub fn write_json(
    path: &Path,
    inventory: &Inventory,
) -> Result<Vec<ScanWarning>, InventoryError> {
    let (inventory, warnings) = writable(inventory);
    let file = File::create(path).map_err(|e| InventoryError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &inventory).map_err(|e| json_error(path, e))?;
    writer.flush().map_err(|e| InventoryError::io(path, e))?;
    Ok(warnings)
}

/// Split off records whose paths cannot be stored as text, then sort.
fn writable(inventory: &Inventory) -> (Inventory, Vec<ScanWarning>) {
    let mut warnings = Vec::new();
    let mut kept = Vec::with_capacity(inventory.len());
    for record in inventory.records() {
        if record.path.to_str().is_some() {
            kept.push(record.clone());
        } else {
            warn!(path = %record.path.display(), "path is not valid UTF-8, not written");
            warnings.push(ScanWarning::unencodable_path(&record.path));
        }
    }

    let mut inventory = Inventory::new(kept);
    inventory.sort_by_size();
    (inventory, warnings)
}

fn csv_error(path: &Path, error: csv::Error) -> InventoryError {
    InventoryError::Csv {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

fn json_error(path: &Path, error: serde_json::Error) -> InventoryError {
    InventoryError::Json {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use twinsift_core::ContentHash;

    fn inventory() -> Inventory {
        Inventory::new(vec![
            FileRecord::new("/a/small.txt", 10, ContentHash::new("s")),
            FileRecord::unhashed("/a/locked.bin", 500),
            FileRecord::symlink("/a/link", 10, None),
            FileRecord::new("/a/big.iso", 9000, ContentHash::new("b")),
        ])
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InventoryFormat::from_path(Path::new("x.json")), InventoryFormat::Json);
        assert_eq!(InventoryFormat::from_path(Path::new("x.JSON")), InventoryFormat::Json);
        assert_eq!(InventoryFormat::from_path(Path::new("x.csv")), InventoryFormat::Csv);
        assert_eq!(InventoryFormat::from_path(Path::new("report")), InventoryFormat::Csv);
    }

    #[test]
    fn test_csv_written_largest_first() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("files.csv");
        write_csv(&path, &inventory()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("path,size,hash,is_symlink"));
        assert_eq!(lines.next(), Some("/a/big.iso,9000,b,false"));
        assert_eq!(lines.next(), Some("/a/locked.bin,500,,false"));

        let loaded = read_csv(&path).unwrap();
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded.records()[1].hash, None);
    }

    #[test]
    fn test_csv_accepts_legacy_columns() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("files_report.csv");
        fs::write(
            &path,
            ",file_path,file_size,file_md5,is_symlink\n\
             0,/x/a.txt,12,abc,False\n\
             1,/x/b.txt,,,True\n\
             2,/x/c.txt,oops,def,False\n",
        )
        .unwrap();

        let loaded = read_csv(&path).unwrap();
        let records = loaded.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].size, Some(12));
        assert_eq!(records[0].hash, Some(ContentHash::new("abc")));
        assert!(!records[0].is_symlink);
        assert_eq!(records[1].size, None);
        assert_eq!(records[1].hash, None);
        assert!(records[1].is_symlink);
        assert_eq!(records[2].size, None);
    }

    #[test]
    fn test_json_inventory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("files.json");
        save_inventory(&path, &inventory()).unwrap();

        let loaded = load_inventory(&path).unwrap();
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded.records()[0].path, Path::new("/a/big.iso"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_are_left_out_with_a_warning() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        use twinsift_core::WarningKind;

        let odd = Path::new(OsStr::from_bytes(b"/a/caf\xE9.txt"));
        let mut records = inventory().into_records();
        records.push(FileRecord::new(odd, 77, ContentHash::new("c")));
        let inventory = Inventory::new(records);

        let temp = TempDir::new().unwrap();
        for name in ["files.csv", "files.json"] {
            let path = temp.path().join(name);
            let warnings = save_inventory(&path, &inventory).unwrap();
            assert_eq!(warnings.len(), 1);
            assert_eq!(warnings[0].kind, WarningKind::UnencodablePath);
            assert_eq!(warnings[0].path, odd);

            let loaded = load_inventory(&path).unwrap();
            assert_eq!(loaded.len(), 4);
            assert!(loaded.records().iter().all(|r| r.path != odd));
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = load_inventory(&temp.path().join("none.csv")).unwrap_err();
        assert!(matches!(err, InventoryError::Io { .. }));
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = read_json(&path).unwrap_err();
        assert!(matches!(err, InventoryError::Json { .. }));
    }
}
