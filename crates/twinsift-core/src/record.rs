//! Inventory record types.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Content digest used to decide file equality.
///
/// The digest is kept as its textual form so inventories produced by other
/// tools (e.g. MD5 hex columns) can be analyzed alongside BLAKE3 hex from the
/// built-in scanner. Two files with equal digests are treated as equal content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(CompactString);

impl ContentHash {
    /// Create a hash from its textual digest.
    pub fn new(digest: impl Into<CompactString>) -> Self {
        Self(digest.into())
    }

    /// Create a hash from raw digest bytes, hex-encoded.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        Self(hex.into())
    }

    /// Get the digest as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of a file inventory, as produced by a scan or loaded from disk.
///
/// `size` and `hash` are optional: an unreadable file yields a record without
/// a hash, and an imported row may carry a missing or malformed size. Such
/// records are dropped by [`crate::Inventory::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path of the file.
    #[serde(alias = "file_path")]
    pub path: PathBuf,

    /// Size in bytes.
    #[serde(default, alias = "file_size", deserialize_with = "lenient_option")]
    pub size: Option<u64>,

    /// Content digest, absent if hashing failed.
    #[serde(default, alias = "file_md5", deserialize_with = "lenient_option")]
    pub hash: Option<ContentHash>,

    /// Whether the path is a symbolic link.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_symlink: bool,
}

impl FileRecord {
    /// Create a record for a successfully hashed regular file.
    pub fn new(path: impl Into<PathBuf>, size: u64, hash: ContentHash) -> Self {
        Self {
            path: path.into(),
            size: Some(size),
            hash: Some(hash),
            is_symlink: false,
        }
    }

    /// Create a record for a file whose content could not be hashed.
    pub fn unhashed(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size: Some(size),
            hash: None,
            is_symlink: false,
        }
    }

    /// Create a record for a symbolic link.
    pub fn symlink(path: impl Into<PathBuf>, size: u64, hash: Option<ContentHash>) -> Self {
        Self {
            path: path.into(),
            size: Some(size),
            hash,
            is_symlink: true,
        }
    }
}

/// A record that passed validation: it has a hash and a positive size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashedFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Size in bytes, always greater than zero.
    pub size: u64,
    /// Content digest.
    pub hash: ContentHash,
    /// Whether the path is a symbolic link.
    pub is_symlink: bool,
}

impl HashedFile {
    /// Directory containing the file.
    pub fn folder(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Final path component, byte for byte.
    pub fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or_default()
    }
}

/// Deserialize an optional field, mapping empty or malformed values to `None`.
fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<LenientValue<T>>::deserialize(deserializer)
        .ok()
        .flatten()
        .and_then(|v| v.0))
}

/// Deserialize a flag written as a bool, `0`/`1`, or `true`/`True`/`FALSE` text.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct FlagVisitor;

    impl serde::de::Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean flag")
        }

        fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" | "" => Ok(false),
                other => Err(E::custom(format!("invalid flag: {other}"))),
            }
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

/// Wrapper that swallows a failed inner deserialization.
struct LenientValue<T>(Option<T>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for LenientValue<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self(T::deserialize(deserializer).ok()))
    }
}
