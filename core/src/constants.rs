//! constants.rs
//! Size thresholds, chunk sizes and fixed names shared across the crate.

use std::time::Duration;

/// Inputs strictly larger than this are handed to the large-diff helper (50 MiB).
pub const SIZE_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Chunk size for the in-process XOR stream (512 KiB).
pub const DIFF_CHUNK_SIZE: usize = 512 * 1024;

/// Default interval between resident-memory samples.
pub const DEFAULT_SAMPLING_INTERVAL: Duration = Duration::from_millis(50);

/// Default wall-clock ceiling for a supervised process (5 hours).
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(18_000);

/// Bytes of stdout/stderr kept per stream for diagnostics.
pub const DEFAULT_OUTPUT_TAIL_BYTES: usize = 8 * 1024;

/// Default artifact directory, relative to the working directory.
pub const DEFAULT_ARTIFACT_DIR: &str = "public_data";

/// Artifact file naming: `diff-<hash>.bin`.
pub const ARTIFACT_PREFIX: &str = "diff-";
pub const ARTIFACT_EXTENSION: &str = "bin";

/// Hex characters of the path hash kept in artifact names.
pub const ARTIFACT_HASH_LEN: usize = 32;

/// Fixed transform output slot.
pub const TRANSFORM_OUTPUT_NAME: &str = "fourier_results.txt";

/// KiB per MiB, used for the peak-memory display unit.
pub const KIB_PER_MIB: f64 = 1024.0;

/// Environment overrides read by `CoreConfig::apply_env`.
pub mod env_vars {
    pub const ARTIFACT_DIR: &str = "FILEDIFF_ARTIFACT_DIR";
    pub const LARGE_DIFF_BIN: &str = "FILEDIFF_LARGE_DIFF_BIN";
    pub const TRANSFORM_BIN: &str = "FILEDIFF_TRANSFORM_BIN";
}
