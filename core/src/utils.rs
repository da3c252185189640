use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::constants::{ARTIFACT_EXTENSION, ARTIFACT_HASH_LEN, ARTIFACT_PREFIX, KIB_PER_MIB};

/// Content address for the diff of `a` against `b`.
///
/// Hashes both paths, length-delimited so `("ab", "c")` and `("a", "bc")`
/// never collide. Order matters: `artifact_name(a, b) != artifact_name(b, a)`.
pub fn artifact_name(a: &Path, b: &Path) -> String {
    let mut hasher = blake3::Hasher::new();
    for p in [a, b] {
        let bytes = p.as_os_str().as_encoded_bytes();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    let hex = hasher.finalize().to_hex();
    format!("{}{}.{}", ARTIFACT_PREFIX, &hex[..ARTIFACT_HASH_LEN], ARTIFACT_EXTENSION)
}

/// Fill `buf` from `r` until full or EOF; returns bytes read.
///
/// A single `read` may return short on pipes and some filesystems, so chunks
/// of two inputs would otherwise drift out of alignment.
pub fn read_full_or_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut off = 0;
    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(off)
}

/// Length of a regular file, or `None` if it is missing or not a file.
pub fn file_len(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len())
}

pub fn is_non_empty_file(path: &Path) -> bool {
    file_len(path).is_some_and(|len| len > 0)
}

pub fn kib_to_mib(kib: u64) -> f64 {
    kib as f64 / KIB_PER_MIB
}

/// Remove a file, treating "already gone" as success.
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
