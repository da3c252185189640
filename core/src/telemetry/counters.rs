//! telemetry/counters.rs
//! Byte and chunk counters collected while the XOR stream runs.

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffCounters {
    pub chunks: u64,
    pub bytes_read_a: u64,
    pub bytes_read_b: u64,
    pub bytes_written: u64,
    /// XOR bytes that came out non-zero.
    pub bytes_differing: u64,
}

impl DiffCounters {
    /// Record one chunk pair.
    ///
    /// - `len_a`, `len_b`: bytes read from each input for this chunk
    /// - `differing`: non-zero bytes in the XOR output for this chunk
    pub fn add_chunk(&mut self, len_a: usize, len_b: usize, differing: usize) {
        self.chunks += 1;
        self.bytes_read_a += len_a as u64;
        self.bytes_read_b += len_b as u64;
        self.bytes_written += len_a.max(len_b) as u64;
        self.bytes_differing += differing as u64;
    }

    pub fn bytes_compared(&self) -> u64 {
        self.bytes_read_a + self.bytes_read_b
    }

    pub fn is_different(&self) -> bool {
        self.bytes_differing > 0
    }
}
