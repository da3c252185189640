//! Benchmarks for the in-process XOR stream.
//!
//! Memory-to-memory, so the numbers reflect the XOR and chunking cost only.

use std::io::{self, Cursor};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use filediff_core::constants::DIFF_CHUNK_SIZE;
use filediff_core::diff::xor_stream;

fn inputs(len: usize) -> (Vec<u8>, Vec<u8>) {
    let a: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    let mut b = a.clone();
    for i in (0..len).step_by(4096) {
        b[i] ^= 0x5A;
    }
    (a, b)
}

/// 8 MiB pair across chunk sizes around the default.
fn bench_xor_stream_chunk_sizes(c: &mut Criterion) {
    let (a, b) = inputs(8 * 1024 * 1024);
    let mut group = c.benchmark_group("xor_stream_8mib");
    group.throughput(Throughput::Bytes((a.len() + b.len()) as u64));

    for chunk in [64 * 1024, DIFF_CHUNK_SIZE, 4 * 1024 * 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |ben, &chunk| {
            ben.iter(|| {
                let counters = xor_stream(
                    &mut Cursor::new(black_box(&a)),
                    &mut Cursor::new(black_box(&b)),
                    &mut io::sink(),
                    chunk,
                )
                .unwrap();
                black_box(counters)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_xor_stream_chunk_sizes);
criterion_main!(benches);
