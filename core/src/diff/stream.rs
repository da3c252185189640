//! diff/stream.rs
//! Chunked XOR of two byte streams.
//!
//! Convention: the shorter input is zero-extended, so the output is as long
//! as the longer input and its trailing bytes are copied verbatim.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::telemetry::DiffCounters;
use crate::utils::read_full_or_eof;

/// Which side of the stream failed, so callers can attach the right path.
#[derive(Debug, Error)]
pub enum XorStreamError {
    #[error("reading first input: {0}")]
    ReadA(#[source] io::Error),
    #[error("reading second input: {0}")]
    ReadB(#[source] io::Error),
    #[error("writing difference: {0}")]
    Write(#[source] io::Error),
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,
}

/// XOR `a` against `b` into `out`, zero-extending the shorter one.
/// Returns the number of non-zero output bytes.
pub fn xor_chunk(a: &[u8], b: &[u8], out: &mut Vec<u8>) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    out.clear();
    out.extend(short.iter().zip(long).map(|(x, y)| x ^ y));
    out.extend_from_slice(&long[short.len()..]);
    out.iter().filter(|&&x| x != 0).count()
}

/// Stream both readers in `chunk_size` pieces, writing the XOR to `out`.
///
/// Every chunk is written, including all-zero ones; whether the result is
/// worth keeping is decided from the returned counters.
pub fn xor_stream<A, B, W>(
    a: &mut A,
    b: &mut B,
    out: &mut W,
    chunk_size: usize,
) -> Result<DiffCounters, XorStreamError>
where
    A: Read,
    B: Read,
    W: Write,
{
    // A zero-length buffer reads as EOF and would report every pair as equal.
    if chunk_size == 0 {
        return Err(XorStreamError::ZeroChunkSize);
    }
    let mut buf_a = vec![0u8; chunk_size];
    let mut buf_b = vec![0u8; chunk_size];
    let mut xored = Vec::with_capacity(chunk_size);
    let mut counters = DiffCounters::default();

    loop {
        let n_a = read_full_or_eof(a, &mut buf_a).map_err(XorStreamError::ReadA)?;
        let n_b = read_full_or_eof(b, &mut buf_b).map_err(XorStreamError::ReadB)?;
        if n_a == 0 && n_b == 0 {
            break;
        }

        let differing = xor_chunk(&buf_a[..n_a], &buf_b[..n_b], &mut xored);
        out.write_all(&xored).map_err(XorStreamError::Write)?;
        counters.add_chunk(n_a, n_b, differing);
    }

    out.flush().map_err(XorStreamError::Write)?;
    Ok(counters)
}

/// Count non-zero bytes in a stream.
pub fn count_nonzero<R: Read>(r: &mut R, chunk_size: usize) -> io::Result<u64> {
    if chunk_size == 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "chunk size must be greater than zero"));
    }
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0u64;
    loop {
        let n = read_full_or_eof(r, &mut buf)?;
        if n == 0 {
            break;
        }
        total += buf[..n].iter().filter(|&&x| x != 0).count() as u64;
    }
    Ok(total)
}
