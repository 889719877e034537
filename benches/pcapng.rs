use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pcapng_annotate::{decode, encode, Capture, PcapError, PcapNGReader};

#[path = "../tests/common/mod.rs"]
mod common;

use common::{CaptureBuilder, COMMENT};

const NUM_PACKETS: usize = 5000;

fn build_capture() -> Vec<u8> {
    let payload = [0x42u8; 342];
    let mut builder = CaptureBuilder::le().shb().idb();
    for i in 0..NUM_PACKETS {
        builder = if i % 10 == 0 {
            builder.epb(&payload[..314], &[(COMMENT, b"sampled packet")])
        } else {
            builder.epb(&payload, &[])
        };
    }
    builder.build()
}

fn bench_decode(c: &mut Criterion) {
    let bytes = build_capture();
    c.bench_function("decode synthetic", |b| b.iter(|| decode(&bytes)));
}

fn bench_encode(c: &mut Criterion) {
    let bytes = build_capture();
    let blocks = decode(&bytes).expect("decode");
    c.bench_function("encode synthetic", |b| b.iter(|| encode(&blocks)));
}

fn bench_set_comment(c: &mut Criterion) {
    let bytes = build_capture();
    let capture = Capture::from_reader(&bytes[..], 65536).expect("capture");
    c.bench_function("set_comment and encode", |b| {
        b.iter(|| {
            let mut capture = capture.clone();
            capture
                .set_comment(NUM_PACKETS / 2, b"benchmark comment")
                .expect("set comment");
            capture.to_vec()
        })
    });
}

fn do_reader_pcapng(bytes: &[u8], buffer_size: usize) {
    let mut num_blocks = 0;
    let mut reader = PcapNGReader::new(buffer_size, bytes);
    loop {
        match reader.next() {
            Ok((offset, _block)) => {
                num_blocks += 1;
                reader.consume(offset);
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::Incomplete(_)) => {
                reader.refill().unwrap();
            }
            Err(e) => panic!("unexpected error {:?}", e),
        }
    }
    assert_eq!(num_blocks, NUM_PACKETS + 2);
}

fn bench_reader_pcapng_buffer_size(c: &mut Criterion) {
    let bytes = build_capture();
    let mut group = c.benchmark_group("reader_pcapng buffer_size");
    const KB16: usize = 16384;
    for buffer_size in [KB16, KB16 * 2, KB16 * 4, KB16 * 8, KB16 * 16].iter() {
        group.throughput(Throughput::Bytes(*buffer_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            buffer_size,
            |b, &size| b.iter(|| do_reader_pcapng(&bytes, size)),
        );
    }
}

criterion_group!(
    benches,
    bench_decode,
    bench_encode,
    bench_set_comment,
    bench_reader_pcapng_buffer_size
);
criterion_main!(benches);
