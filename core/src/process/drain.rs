//! process/drain.rs
//! Background readers that keep a child's stdout/stderr pipes from filling up.

use std::io::{self, Read};
use std::thread::{self, JoinHandle};

const READ_BUF: usize = 8 * 1024;

/// Keeps only the last `limit` bytes written into it.
#[derive(Debug, Default)]
pub struct TailBuffer {
    buf: Vec<u8>,
    limit: usize,
    total: u64,
}

impl TailBuffer {
    pub fn new(limit: usize) -> Self {
        Self { buf: Vec::new(), limit, total: 0 }
    }

    pub fn push(&mut self, data: &[u8]) {
        self.total += data.len() as u64;
        if self.limit == 0 {
            return;
        }
        if data.len() >= self.limit {
            self.buf.clear();
            self.buf.extend_from_slice(&data[data.len() - self.limit..]);
            return;
        }
        self.buf.extend_from_slice(data);
        if self.buf.len() > self.limit {
            let excess = self.buf.len() - self.limit;
            self.buf.drain(..excess);
        }
    }

    /// Bytes seen in total, including those dropped from the tail.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Spawn a named thread that reads `stream` to EOF, keeping a bounded tail.
///
/// Read errors end the drain early; whatever was captured is still returned.
pub fn spawn_drainer<R>(name: String, mut stream: R, limit: usize) -> io::Result<JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new().name(name).spawn(move || {
        let mut tail = TailBuffer::new(limit);
        let mut chunk = [0u8; READ_BUF];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => tail.push(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::trace!(error = %e, "stream drain ended early");
                    break;
                }
            }
        }
        tail.into_bytes()
    })
}
