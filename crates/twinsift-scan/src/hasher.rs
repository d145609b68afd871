//! BLAKE3 content hashing.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use blake3::Hasher;

use twinsift_core::ContentHash;

/// Files above this size are hashed through a memory map.
pub const MMAP_THRESHOLD: u64 = 128 * 1024;

const BUFFER_SIZE: usize = 64 * 1024;

/// Compute the full BLAKE3 digest of a file.
pub fn hash_file(path: &Path) -> io::Result<ContentHash> {
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();

    let mut hasher = Hasher::new();
    if file_size > MMAP_THRESHOLD {
        hasher.update_mmap(path)?;
    } else {
        hash_reader(&mut hasher, file)?;
    }
    Ok(ContentHash::from_bytes(hasher.finalize().as_bytes()))
}

/// Compute the BLAKE3 digest of an in-memory buffer.
pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    ContentHash::from_bytes(blake3::hash(bytes).as_bytes())
}

fn hash_reader(hasher: &mut Hasher, mut reader: impl Read) -> io::Result<()> {
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }
}
